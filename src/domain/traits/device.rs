use async_trait::async_trait;
use crate::domain::entities::{Capability, CommandResult, Params};

/// Device client - one request, one outcome
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Issue a single request for `capability`. Failures come back as `Err`, never as panics.
    async fn request(&self, capability: Capability, params: &Params) -> CommandResult;
}

use async_trait::async_trait;

/// Authorization store - the set of identities allowed to control the device
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Membership check, no side effects
    async fn is_authorized(&self, identity: &str) -> bool;

    /// Admit `identity` if `secret` matches. A mismatch leaves the set unchanged.
    async fn authorize(&self, identity: &str, secret: &str) -> bool;
}

//! HTTP client for the watering controller

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::application::errors::DeviceError;
use crate::domain::entities::{Capability, CommandResult, Fields, Params};
use crate::domain::traits::DeviceClient;
use crate::infrastructure::config::{DeviceConfig, DevicePaths};

/// Device client issuing `GET <base><path>?<query>` with a fixed timeout
pub struct HttpDeviceClient {
    base_url: String,
    paths: DevicePaths,
    timeout: Duration,
    client: Client,
}

impl HttpDeviceClient {
    pub fn new(config: &DeviceConfig) -> Result<Self, DeviceError> {
        Self::with_timeout(config.base_url(), config.paths.clone(), config.timeout())
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        paths: DevicePaths,
        timeout: Duration,
    ) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("greenhouse-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeviceError::Transport(format!("Client error: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            paths,
            timeout,
            client,
        })
    }

    /// Full URL for a capability, without query
    pub fn url(&self, capability: Capability) -> String {
        format!("{}{}", self.base_url, self.paths.path(capability))
    }

    fn transport_error(&self, err: &reqwest::Error) -> DeviceError {
        if err.is_timeout() {
            return DeviceError::Transport(format!(
                "device did not respond within {}s",
                self.timeout.as_secs_f32()
            ));
        }
        DeviceError::Transport(error_chain(err))
    }
}

#[async_trait]
impl DeviceClient for HttpDeviceClient {
    async fn request(&self, capability: Capability, params: &Params) -> CommandResult {
        let url = self.url(capability);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        parse_body(status, &body)
    }
}

/// Turn a device response body into fields, surfacing an `error` key as a fault
pub fn parse_body(status: StatusCode, body: &str) -> CommandResult {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        DeviceError::Decode(format!("invalid response from device (HTTP {}): {}", status.as_u16(), e))
    })?;

    let Value::Object(map) = value else {
        return Err(DeviceError::Decode(format!(
            "invalid response from device (HTTP {}): expected a JSON object",
            status.as_u16()
        )));
    };

    if let Some(error) = map.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            Value::Null => "unknown device error".to_string(),
            other => other.to_string(),
        };
        return Err(DeviceError::Upstream(message));
    }

    Ok(Fields::new(map))
}

/// Join an error with its sources, e.g. `error sending request: tcp connect error: Connection refused`
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

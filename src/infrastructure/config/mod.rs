//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;
use crate::domain::entities::Capability;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub device: DeviceConfig,
    pub auth: AuthConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

/// Where the watering controller lives
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub paths: DevicePaths,
}

/// Request path for each capability
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DevicePaths {
    pub moisture: String,
    pub light: String,
    pub pump: String,
    pub status: String,
    pub schedule: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthConfig {
    /// Shared password for `/auth`
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for DevicePaths {
    fn default() -> Self {
        Self {
            moisture: "/moisture".to_string(),
            light: "/light".to_string(),
            pump: "/pump".to_string(),
            status: "/status".to_string(),
            schedule: "/schedule".to_string(),
        }
    }
}

impl DevicePaths {
    pub fn path(&self, capability: Capability) -> &str {
        match capability {
            Capability::Moisture => &self.moisture,
            Capability::Light => &self.light,
            Capability::Pump => &self.pump,
            Capability::Status => &self.status,
            Capability::Schedule => &self.schedule,
        }
    }
}

impl DeviceConfig {
    /// `scheme://host:port`, defaulting the scheme to http
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "greenhouse-bot".to_string(),
                prefix: "/".to_string(),
            },
            device: DeviceConfig {
                host: "http://192.168.1.100".to_string(),
                port: 80,
                timeout_seconds: default_timeout_seconds(),
                paths: DevicePaths::default(),
            },
            auth: AuthConfig {
                secret: String::new(),
            },
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Apply `BOT_TOKEN`, `BOT_PREFIX`, `DEVICE_HOST`, `DEVICE_PORT` and `AUTH_SECRET`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.set_token(token);
        }

        if let Some(prefix) = lookup("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(host) = lookup("DEVICE_HOST") {
            self.device.host = host;
        }

        if let Some(port) = lookup("DEVICE_PORT") {
            match port.parse() {
                Ok(port) => self.device.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DEVICE_PORT: {}", port),
            }
        }

        if let Some(secret) = lookup("AUTH_SECRET") {
            self.auth.secret = secret;
        }
    }

    /// Enable Telegram with the given token
    pub fn set_token(&mut self, token: String) {
        let tg = self.adapters.telegram.get_or_insert(TelegramConfig {
            enabled: true,
            token: None,
        });
        tg.token = Some(token);
        tg.enabled = true;
    }

    /// Token of the enabled Telegram adapter, if any
    pub fn telegram_token(&self) -> Option<&str> {
        self.adapters
            .telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Whether the console adapter may run when Telegram is not configured
    pub fn console_enabled(&self) -> bool {
        self.adapters.console.as_ref().is_some_and(|c| c.enabled)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token().is_none() && !self.console_enabled() {
            return Err(ConfigError::InvalidValue(
                "no adapter enabled: set a Telegram token or enable adapters.console".to_string(),
            ));
        }
        if self.auth.secret.is_empty() {
            return Err(ConfigError::MissingField("auth.secret".to_string()));
        }
        if self.device.host.is_empty() {
            return Err(ConfigError::MissingField("device.host".to_string()));
        }
        if self.device.port == 0 {
            return Err(ConfigError::InvalidValue("device.port must be non-zero".to_string()));
        }
        if self.device.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "device.timeout-seconds must be non-zero".to_string(),
            ));
        }
        let paths = &self.device.paths;
        for capability in [
            Capability::Moisture,
            Capability::Light,
            Capability::Pump,
            Capability::Status,
            Capability::Schedule,
        ] {
            if !paths.path(capability).starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "device.paths.{} must start with '/'",
                    capability
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_yaml_with_default_paths() {
        let yaml = r#"
bot:
  name: greenhouse
  prefix: "/"
device:
  host: 10.0.0.7
  port: 8080
auth:
  secret: hunter2
adapters:
  telegram:
    enabled: true
    token: "123:abc"
  console: null
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.device.base_url(), "http://10.0.0.7:8080");
        assert_eq!(config.device.timeout(), Duration::from_secs(10));
        assert_eq!(config.device.paths.path(Capability::Schedule), "/schedule");
        assert_eq!(config.telegram_token(), Some("123:abc"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_config_round_trips_but_needs_a_secret() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.device.base_url(), "http://192.168.1.100:80");
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
        assert_eq!(config.telegram_token(), None);
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BOT_TOKEN", "999:xyz"),
            ("DEVICE_HOST", "https://garden.local"),
            ("DEVICE_PORT", "8443"),
            ("AUTH_SECRET", "s3cret"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.telegram_token(), Some("999:xyz"));
        assert_eq!(config.device.base_url(), "https://garden.local:8443");
        assert_eq!(config.auth.secret, "s3cret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "DEVICE_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.device.port, 80);
    }

    #[test]
    fn requires_an_enabled_adapter() {
        let mut config = Config::default();
        config.auth.secret = "x".to_string();
        assert!(config.validate().is_ok());

        config.adapters.console = Some(ConsoleConfig { enabled: false });
        assert!(!config.console_enabled());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        config.adapters.console = None;
        assert!(config.validate().is_err());

        config.set_token("123:abc".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_relative_paths() {
        let mut config = Config::default();
        config.auth.secret = "x".to_string();
        config.device.paths.pump = "pump".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }
}

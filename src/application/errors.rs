//! Application layer errors

use thiserror::Error;

/// Chat transport errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Command parsing and argument validation errors.
///
/// The display text is sent to the user as-is, so every variant reads as a
/// usage hint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0}\nUse /help to see the available commands.")]
    NotFound(String),

    #[error("Please enter the password after /auth.\nExample: /auth <password>")]
    MissingSecret,

    #[error("Please specify the pump run time in seconds.\nExample: /pump_time 10")]
    InvalidPumpDuration,

    #[error(
        "Please specify the watering time and interval.\n\
         Format: /set_schedule HH:MM interval_in_hours\n\
         Example: /set_schedule 08:00 24 (water every day at 8 AM)"
    )]
    MissingScheduleArgs,

    #[error("Invalid time format. Use HH:MM, for example 08:00")]
    InvalidScheduleTime,

    #[error("The interval must be a number (hours)")]
    InvalidScheduleInterval,
}

/// Device client errors.
///
/// Every variant displays only its cause so replies read `Error: <cause>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Connection, DNS or timeout failure
    #[error("{0}")]
    Transport(String),

    /// The device answered with something that is not a JSON object
    #[error("{0}")]
    Decode(String),

    /// The device answered with an explicit `error` field
    #[error("{0}")]
    Upstream(String),
}

impl DeviceError {
    /// True when the fault was reported by the device itself
    pub fn is_upstream(&self) -> bool {
        matches!(self, DeviceError::Upstream(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

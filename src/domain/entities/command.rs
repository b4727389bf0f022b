use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::device::{Capability, DeviceRequest};
use super::User;
use crate::application::errors::CommandError;

static SCHEDULE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{1,2})$").expect("schedule time pattern is valid")
});

/// Where an invocation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationSource {
    Text,
    Button,
}

/// A single (identity, command, arguments) event delivered by a transport
#[derive(Debug, Clone)]
pub struct Invocation {
    pub chat_id: String,
    pub sender: User,
    pub name: String,
    pub args: Vec<String>,
    pub source: InvocationSource,
}

impl Invocation {
    pub fn text(chat_id: impl Into<String>, sender: User, name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender,
            name: name.into(),
            args,
            source: InvocationSource::Text,
        }
    }

    /// Button presses carry no arguments
    pub fn button(chat_id: impl Into<String>, sender: User, name: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender,
            name: name.into(),
            args: Vec::new(),
            source: InvocationSource::Button,
        }
    }

    pub fn identity(&self) -> &str {
        &self.sender.id
    }
}

/// Watering schedule requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub hour: u8,
    pub minute: u8,
    pub interval_hours: u64,
}

impl ScheduleSpec {
    pub fn parse(time: &str, interval: &str) -> Result<Self, CommandError> {
        let caps = SCHEDULE_TIME
            .captures(time)
            .ok_or(CommandError::InvalidScheduleTime)?;
        let hour: u8 = caps[1].parse().map_err(|_| CommandError::InvalidScheduleTime)?;
        let minute: u8 = caps[2].parse().map_err(|_| CommandError::InvalidScheduleTime)?;
        if hour >= 24 || minute >= 60 {
            return Err(CommandError::InvalidScheduleTime);
        }

        let interval_hours =
            parse_digits(interval).ok_or(CommandError::InvalidScheduleInterval)?;

        Ok(Self {
            hour,
            minute,
            interval_hours,
        })
    }

    /// Time of day as `HH:MM`
    pub fn time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Every command the bot understands, with typed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Auth { secret: String },
    Panel,
    Status,
    Moisture,
    Light,
    PumpOn,
    PumpOff,
    PumpFor { seconds: u64 },
    SetSchedule(ScheduleSpec),
    GetSchedule,
    CancelSchedule,
}

impl Command {
    /// Parse a command name and its raw arguments.
    ///
    /// Names are case-insensitive and may carry a `@botname` suffix.
    pub fn parse(name: &str, args: &[String]) -> Result<Self, CommandError> {
        let name = Self::normalize_name(name);

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "auth" => match args {
                [secret] => Command::Auth {
                    secret: secret.clone(),
                },
                _ => return Err(CommandError::MissingSecret),
            },
            "panel" => Command::Panel,
            "status" => Command::Status,
            "moisture" => Command::Moisture,
            "light" => Command::Light,
            "pump_on" => Command::PumpOn,
            "pump_off" => Command::PumpOff,
            "pump_time" => {
                let seconds = args
                    .first()
                    .and_then(|s| parse_digits(s))
                    .ok_or(CommandError::InvalidPumpDuration)?;
                Command::PumpFor { seconds }
            }
            "set_schedule" => match args {
                [time, interval, ..] => Command::SetSchedule(ScheduleSpec::parse(time, interval)?),
                _ => return Err(CommandError::MissingScheduleArgs),
            },
            "get_schedule" => Command::GetSchedule,
            "cancel_schedule" => Command::CancelSchedule,
            _ => return Err(CommandError::NotFound(name)),
        };

        Ok(command)
    }

    /// Lowercased name without the leading `/` or a `@botname` suffix
    pub fn normalize_name(name: &str) -> String {
        let name = name.trim_start_matches('/');
        name.split('@').next().unwrap_or(name).to_lowercase()
    }

    /// Names that skip the auth gate, checked even when arguments fail to parse
    pub fn is_public_name(name: &str) -> bool {
        matches!(Self::normalize_name(name).as_str(), "start" | "help" | "auth")
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Auth { .. } => "auth",
            Command::Panel => "panel",
            Command::Status => "status",
            Command::Moisture => "moisture",
            Command::Light => "light",
            Command::PumpOn => "pump_on",
            Command::PumpOff => "pump_off",
            Command::PumpFor { .. } => "pump_time",
            Command::SetSchedule(_) => "set_schedule",
            Command::GetSchedule => "get_schedule",
            Command::CancelSchedule => "cancel_schedule",
        }
    }

    /// Whether the sender must be authorized first
    pub fn is_privileged(&self) -> bool {
        !matches!(self, Command::Start | Command::Help | Command::Auth { .. })
    }

    /// The device call this command maps to, if any
    pub fn device_request(&self) -> Option<DeviceRequest> {
        let request = match self {
            Command::Start | Command::Help | Command::Auth { .. } | Command::Panel => return None,
            Command::Status => DeviceRequest::new(Capability::Status),
            Command::Moisture => DeviceRequest::new(Capability::Moisture),
            Command::Light => DeviceRequest::new(Capability::Light),
            Command::PumpOn => DeviceRequest::new(Capability::Pump).with_param("state", "on"),
            Command::PumpOff => DeviceRequest::new(Capability::Pump).with_param("state", "off"),
            Command::PumpFor { seconds } => DeviceRequest::new(Capability::Pump)
                .with_param("state", "time")
                .with_param("time", seconds.to_string()),
            Command::SetSchedule(spec) => DeviceRequest::new(Capability::Schedule)
                .with_param("action", "set")
                .with_param("time", spec.time())
                .with_param("interval", spec.interval_hours.to_string()),
            Command::GetSchedule => {
                DeviceRequest::new(Capability::Schedule).with_param("action", "get")
            }
            Command::CancelSchedule => {
                DeviceRequest::new(Capability::Schedule).with_param("action", "cancel")
            }
        };
        Some(request)
    }
}

/// Non-empty run of ASCII digits as an integer
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_names_case_insensitively_with_bot_suffix() {
        assert_eq!(Command::parse("Status", &[]), Ok(Command::Status));
        assert_eq!(Command::parse("/pump_on@greenhouse_bot", &[]), Ok(Command::PumpOn));
        assert_eq!(
            Command::parse("water", &[]),
            Err(CommandError::NotFound("water".to_string()))
        );
    }

    #[test]
    fn auth_requires_exactly_one_argument() {
        assert_eq!(Command::parse("auth", &[]), Err(CommandError::MissingSecret));
        assert_eq!(
            Command::parse("auth", &args(&["a", "b"])),
            Err(CommandError::MissingSecret)
        );
        assert_eq!(
            Command::parse("auth", &args(&["plant"])),
            Ok(Command::Auth {
                secret: "plant".to_string()
            })
        );
    }

    #[test]
    fn pump_time_accepts_only_digits() {
        assert_eq!(
            Command::parse("pump_time", &args(&["10"])),
            Ok(Command::PumpFor { seconds: 10 })
        );
        for bad in ["abc", "-5", "+5", "1.5", ""] {
            assert_eq!(
                Command::parse("pump_time", &args(&[bad])),
                Err(CommandError::InvalidPumpDuration),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(Command::parse("pump_time", &[]), Err(CommandError::InvalidPumpDuration));
    }

    #[test]
    fn schedule_time_bounds() {
        assert!(ScheduleSpec::parse("00:00", "1").is_ok());
        assert!(ScheduleSpec::parse("23:59", "1").is_ok());
        assert!(ScheduleSpec::parse("8:05", "1").is_ok());
        assert_eq!(ScheduleSpec::parse("24:00", "1"), Err(CommandError::InvalidScheduleTime));
        assert_eq!(ScheduleSpec::parse("08:60", "1"), Err(CommandError::InvalidScheduleTime));
        assert_eq!(ScheduleSpec::parse("0800", "1"), Err(CommandError::InvalidScheduleTime));
        assert_eq!(ScheduleSpec::parse("ab:cd", "1"), Err(CommandError::InvalidScheduleTime));
        assert_eq!(
            ScheduleSpec::parse("08:00", "daily"),
            Err(CommandError::InvalidScheduleInterval)
        );
    }

    #[test]
    fn set_schedule_needs_two_arguments() {
        assert_eq!(
            Command::parse("set_schedule", &args(&["08:00"])),
            Err(CommandError::MissingScheduleArgs)
        );
    }

    #[test]
    fn set_schedule_maps_to_padded_time() {
        let command = Command::parse("set_schedule", &args(&["8:00", "24"])).unwrap();
        let request = command.device_request().unwrap();
        assert_eq!(request.capability, Capability::Schedule);
        assert_eq!(request.params["action"], "set");
        assert_eq!(request.params["time"], "08:00");
        assert_eq!(request.params["interval"], "24");
    }

    #[test]
    fn only_start_help_and_auth_are_public() {
        assert!(!Command::Start.is_privileged());
        assert!(!Command::Help.is_privileged());
        assert!(!Command::Auth { secret: String::new() }.is_privileged());
        assert!(Command::Panel.is_privileged());
        assert!(Command::Status.is_privileged());
        assert!(Command::CancelSchedule.is_privileged());
    }
}

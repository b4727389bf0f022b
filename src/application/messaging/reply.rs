//! Reply templates - Turn device results into user-facing text
//!
//! Each template declares the fields it reads and the text shown when the
//! device leaves one out, so formatting never fails on a missing key.

use crate::domain::entities::{Command, CommandResult, Fields};
use crate::domain::traits::KeyboardButton;

/// Placeholder for measured values the device did not report
pub const NOT_AVAILABLE: &str = "N/A";

pub const NOT_AUTHORIZED: &str = "Error: you are not authorized! Use /auth <password> first.";
pub const AUTH_OK: &str = "Authorization successful! You can now control the system.";
pub const AUTH_ALREADY: &str = "You are already authorized!";
pub const AUTH_REJECTED: &str = "Wrong password. Example: /auth <password>";
pub const NO_SCHEDULE: &str = "No watering schedule set.";
pub const BUSY: &str = "Too many pending commands, please try again in a moment.";

/// A device field and its fallback text
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub fallback: &'static str,
}

impl Field {
    pub const fn new(key: &'static str, fallback: &'static str) -> Self {
        Self { key, fallback }
    }

    pub fn render(&self, fields: &Fields) -> String {
        fields.text(self.key).unwrap_or_else(|| self.fallback.to_string())
    }
}

/// A boolean-like device field with its on/off labels
#[derive(Debug, Clone, Copy)]
pub struct Flag {
    pub key: &'static str,
    pub on: &'static str,
    pub off: &'static str,
}

impl Flag {
    pub const fn new(key: &'static str, on: &'static str, off: &'static str) -> Self {
        Self { key, on, off }
    }

    pub fn render(&self, fields: &Fields) -> &'static str {
        if fields.flag(self.key) {
            self.on
        } else {
            self.off
        }
    }
}

pub mod status {
    use super::*;

    pub const MOISTURE: Field = Field::new("moisture", NOT_AVAILABLE);
    pub const LIGHT: Field = Field::new("light", NOT_AVAILABLE);
    pub const PUMP: Flag = Flag::new("pump_status", "ON", "OFF");
    pub const SCHEDULE: Flag = Flag::new("schedule_active", "active", "inactive");
    pub const SCHEDULE_TIME: Field = Field::new("schedule_time", "not set");
    pub const LAST_WATERED: Field = Field::new("last_watered", "unavailable");
}

pub mod schedule {
    use super::*;

    pub const ACTIVE: Flag = Flag::new("active", "active", "inactive");
    pub const TIME: Field = Field::new("time", NOT_AVAILABLE);
    pub const INTERVAL: Field = Field::new("interval", NOT_AVAILABLE);
    pub const NEXT_WATERING: Field = Field::new("next_watering", NOT_AVAILABLE);
}

pub const MOISTURE: Field = Field::new("moisture", NOT_AVAILABLE);
pub const LIGHT: Field = Field::new("light", NOT_AVAILABLE);

/// Format the outcome of a device command
pub fn format_result(command: &Command, result: &CommandResult) -> String {
    match result {
        Err(e) => format!("Error: {}", e),
        Ok(fields) => format_fields(command, fields),
    }
}

fn format_fields(command: &Command, fields: &Fields) -> String {
    match command {
        Command::Status => format!(
            "📊 System status:\n\n\
             💧 Soil moisture: {}%\n\
             ☀️ Light level: {} lux\n\
             🚿 Pump: {}\n\
             ⏰ Schedule: {}\n\
             🕒 Watering time: {}\n\
             📅 Last watered: {}",
            status::MOISTURE.render(fields),
            status::LIGHT.render(fields),
            status::PUMP.render(fields),
            status::SCHEDULE.render(fields),
            status::SCHEDULE_TIME.render(fields),
            status::LAST_WATERED.render(fields),
        ),
        Command::Moisture => format!("💧 Current soil moisture: {}%", MOISTURE.render(fields)),
        Command::Light => format!("☀️ Current light level: {} lux", LIGHT.render(fields)),
        Command::PumpOn => "🚿 Pump turned on!".to_string(),
        Command::PumpOff => "🚿 Pump turned off!".to_string(),
        Command::PumpFor { seconds } => format!("🚿 Pump turned on for {} seconds!", seconds),
        Command::SetSchedule(spec) => format!(
            "⏰ Schedule set!\nWatering time: {}\nInterval: every {} hours",
            spec.time(),
            spec.interval_hours
        ),
        Command::GetSchedule => {
            if !fields.flag(schedule::ACTIVE.key) {
                return NO_SCHEDULE.to_string();
            }
            format!(
                "⏰ Current schedule:\n\n\
                 🕒 Watering time: {}\n\
                 🔄 Interval: every {} hours\n\
                 📅 Next watering: {}",
                schedule::TIME.render(fields),
                schedule::INTERVAL.render(fields),
                schedule::NEXT_WATERING.render(fields),
            )
        }
        Command::CancelSchedule => "⏰ Watering schedule cancelled!".to_string(),
        Command::Start | Command::Help | Command::Auth { .. } | Command::Panel => String::new(),
    }
}

pub fn welcome(name: &str) -> String {
    format!(
        "Hello, {}!\n\n\
         I am a bot for controlling the plant watering system.\n\
         Use /help to see the list of available commands.\n\n\
         To get started, authorize with the /auth command.",
        name
    )
}

pub fn help() -> &'static str {
    "Available commands:\n\n\
     /start - Start working with the bot\n\
     /help - Show this message\n\
     /auth - Authorize in the system\n\
     /panel - Show the control panel\n\
     /status - Current system status\n\
     /moisture - Current soil moisture\n\
     /light - Current light level\n\
     /pump_on - Turn the pump on\n\
     /pump_off - Turn the pump off\n\
     /pump_time - Run the pump for N seconds\n\
     /set_schedule - Set the watering schedule\n\
     /get_schedule - Show the current schedule\n\
     /cancel_schedule - Cancel the watering schedule"
}

pub const PANEL_TITLE: &str = "Control panel:";

/// Inline keyboard for `/panel`; callback data is the command name
pub fn panel_keyboard() -> Vec<Vec<KeyboardButton>> {
    vec![
        vec![
            KeyboardButton::new("📊 Status", "status"),
            KeyboardButton::new("💧 Moisture", "moisture"),
            KeyboardButton::new("☀️ Light", "light"),
        ],
        vec![
            KeyboardButton::new("🚿 Pump on", "pump_on"),
            KeyboardButton::new("🚿 Pump off", "pump_off"),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::DeviceError;
    use serde_json::{json, Value};

    fn ok(value: Value) -> CommandResult {
        match value {
            Value::Object(map) => Ok(Fields::new(map)),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn status_renders_present_fields_and_flags() {
        let result = ok(json!({
            "moisture": 55,
            "light": 300,
            "pump_status": true,
            "schedule_active": false,
        }));
        let text = format_result(&Command::Status, &result);

        assert!(text.contains("55%"));
        assert!(text.contains("300 lux"));
        assert!(text.contains("Pump: ON"));
        assert!(text.contains("Schedule: inactive"));
        assert!(text.contains("Watering time: not set"));
        assert!(text.contains("Last watered: unavailable"));
        assert!(!text.contains(NOT_AVAILABLE));
    }

    #[test]
    fn status_substitutes_placeholder_for_absent_measurements() {
        let text = format_result(&Command::Status, &ok(json!({"light": 12})));
        assert!(text.contains(&format!("Soil moisture: {}%", NOT_AVAILABLE)));
        assert!(text.contains("12 lux"));
        assert!(text.contains("Pump: OFF"));
    }

    #[test]
    fn inactive_schedule_uses_fixed_message() {
        let text = format_result(&Command::GetSchedule, &ok(json!({"active": false, "time": "08:00"})));
        assert_eq!(text, NO_SCHEDULE);

        let text = format_result(&Command::GetSchedule, &ok(json!({})));
        assert_eq!(text, NO_SCHEDULE);
    }

    #[test]
    fn active_schedule_lists_fields() {
        let text = format_result(
            &Command::GetSchedule,
            &ok(json!({"active": true, "time": "08:00", "interval": 24})),
        );
        assert!(text.contains("Watering time: 08:00"));
        assert!(text.contains("every 24 hours"));
        assert!(text.contains(&format!("Next watering: {}", NOT_AVAILABLE)));
    }

    #[test]
    fn errors_are_prefixed() {
        let result = Err(DeviceError::Transport("connection refused".to_string()));
        assert_eq!(format_result(&Command::PumpOn, &result), "Error: connection refused");
    }

    #[test]
    fn panel_buttons_map_to_commands() {
        let names: Vec<_> = panel_keyboard()
            .into_iter()
            .flatten()
            .map(|b| b.callback_data)
            .collect();
        assert_eq!(names, ["status", "moisture", "light", "pump_on", "pump_off"]);
        for name in names {
            assert!(Command::parse(&name, &[]).is_ok());
        }
    }
}

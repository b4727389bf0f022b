use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::application::errors::DeviceError;

/// A fixed device function with its own request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Moisture,
    Light,
    Pump,
    Status,
    Schedule,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Moisture => "moisture",
            Capability::Light => "light",
            Capability::Pump => "pump",
            Capability::Status => "status",
            Capability::Schedule => "schedule",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters sent with a device request
pub type Params = BTreeMap<String, String>;

/// One outbound device call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    pub capability: Capability,
    pub params: Params,
}

impl DeviceRequest {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Schema-less key/value body returned by the device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Truthiness of a field; absent or null counts as false
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).map(is_truthy).unwrap_or(false)
    }

    /// Render a field for display, without JSON quoting for strings
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Outcome of a single device request
pub type CommandResult = Result<Fields, DeviceError>;

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => Fields::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn flag_follows_truthiness() {
        let f = fields(json!({
            "on": true,
            "off": false,
            "one": 1,
            "zero": 0,
            "word": "yes",
            "blank": "",
            "nothing": null,
        }));
        assert!(f.flag("on"));
        assert!(!f.flag("off"));
        assert!(f.flag("one"));
        assert!(!f.flag("zero"));
        assert!(f.flag("word"));
        assert!(!f.flag("blank"));
        assert!(!f.flag("nothing"));
        assert!(!f.flag("missing"));
    }

    #[test]
    fn text_renders_strings_without_quotes() {
        let f = fields(json!({"time": "08:00", "moisture": 55, "ratio": 0.5, "gone": null}));
        assert_eq!(f.text("time").as_deref(), Some("08:00"));
        assert_eq!(f.text("moisture").as_deref(), Some("55"));
        assert_eq!(f.text("ratio").as_deref(), Some("0.5"));
        assert_eq!(f.text("gone"), None);
        assert_eq!(f.text("missing"), None);
    }
}

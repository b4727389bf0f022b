//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use greenhouse_bot::application::errors::{BotError, DeviceError};
use greenhouse_bot::application::services::CommandService;
use greenhouse_bot::domain::entities::{Capability, CommandResult, Fields, Invocation, Params, User};
use greenhouse_bot::domain::traits::{Bot, BotInfo, DeviceClient, KeyboardButton};
use greenhouse_bot::infrastructure::storage::MemoryAuthStore;

pub const SECRET: &str = "plant123";

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Device fake that records every call and answers with a fixed result
pub struct RecordingDevice {
    calls: Mutex<Vec<(Capability, Params)>>,
    result: CommandResult,
    delay: Option<Duration>,
}

impl RecordingDevice {
    pub fn ok(body: serde_json::Value) -> Self {
        let map = match body {
            serde_json::Value::Object(map) => map,
            other => panic!("device body must be an object, got {other}"),
        };
        Self {
            calls: Mutex::new(Vec::new()),
            result: Ok(Fields::new(map)),
            delay: None,
        }
    }

    pub fn failing(error: DeviceError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            result: Err(error),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(Capability, Params)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceClient for RecordingDevice {
    async fn request(&self, capability: Capability, params: &Params) -> CommandResult {
        self.calls.lock().unwrap().push((capability, params.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

/// Bot fake that records outgoing replies
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<(String, String, Option<Vec<Vec<KeyboardButton>>>)>>,
    pub answered: Mutex<Vec<String>>,
}

impl RecordingBot {
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text, _)| text.clone()).collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        self.sent.lock().unwrap().push((chat_id.to_string(), text.to_string(), None));
        Ok("1".to_string())
    }

    async fn send_with_keyboard(&self, chat_id: &str, text: &str, buttons: Vec<Vec<KeyboardButton>>) -> Result<String, BotError> {
        self.sent.lock().unwrap().push((chat_id.to_string(), text.to_string(), Some(buttons)));
        Ok("1".to_string())
    }

    async fn answer_callback(&self, callback_id: &str, _text: Option<&str>) -> Result<(), BotError> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "test".to_string(),
            name: "test".to_string(),
            username: "test_bot".to_string(),
        }
    }
}

pub fn router(device: Arc<RecordingDevice>) -> (CommandService, Arc<MemoryAuthStore>) {
    ensure_init();
    let auth = Arc::new(MemoryAuthStore::new(SECRET));
    let service = CommandService::new(auth.clone(), device);
    (service, auth)
}

pub fn user(id: &str) -> User {
    User::new(id).with_name("Tester", None::<String>)
}

pub fn invoke(id: &str, name: &str, args: &[&str]) -> Invocation {
    Invocation::text(id, user(id), name, args.iter().map(|s| s.to_string()).collect())
}

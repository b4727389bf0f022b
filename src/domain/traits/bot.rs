use async_trait::async_trait;
use crate::application::errors::BotError;

/// Bot trait - abstraction for chat transports
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot and begin listening for messages
    async fn start(&self) -> Result<(), BotError>;

    /// Send a message to a chat
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// Send a message with inline keyboard
    async fn send_with_keyboard(&self, chat_id: &str, text: &str, buttons: Vec<Vec<KeyboardButton>>) -> Result<String, BotError>;

    /// Answer a callback query
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;

    /// Deliver a router reply, with its keyboard when it has one
    async fn send_reply(&self, chat_id: &str, reply: Reply) -> Result<String, BotError> {
        match reply.keyboard {
            Some(buttons) => self.send_with_keyboard(chat_id, &reply.text, buttons).await,
            None => self.send_message(chat_id, &reply.text).await,
        }
    }
}

/// Keyboard button for inline keyboards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Text reply for the originating chat, optionally with an inline keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Vec<Vec<KeyboardButton>>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, rows: Vec<Vec<KeyboardButton>>) -> Self {
        self.keyboard = Some(rows);
        self
    }
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}

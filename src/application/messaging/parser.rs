//! Message parser - Parses raw transport input into structured messages

use crate::domain::entities::{Message, User};

/// Parses incoming text and button presses into `Message` objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message; `/name arg1 arg2` becomes a command
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<User>) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();
        let trimmed = text.trim();

        let body = if let Some(rest) = trimmed.strip_prefix('/') {
            Some(rest)
        } else if !self.command_prefix.is_empty() {
            trimmed.strip_prefix(self.command_prefix.as_str())
        } else {
            None
        };

        match body {
            Some(body) => {
                let mut parts = body.split_whitespace();
                let name = parts.next().unwrap_or_default().to_string();
                let args = parts.map(str::to_string).collect();
                Message::from_command(chat_id, name, args).with_sender_opt(sender)
            }
            None => Message::from_text(chat_id, text).with_sender_opt(sender),
        }
    }

    /// Parse a callback query (inline button press)
    pub fn parse_callback(
        &self,
        chat_id: impl Into<String>,
        callback_id: impl Into<String>,
        data: impl Into<String>,
        user: User,
    ) -> Message {
        Message::from_callback(chat_id, callback_id, data).with_sender(user)
    }
}

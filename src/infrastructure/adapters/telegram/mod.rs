//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities;
use crate::domain::traits::{Bot, BotInfo, KeyboardButton};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl From<&User> for entities::User {
    fn from(user: &User) -> Self {
        let mut out = entities::User::new(user.id.to_string());
        if let Some(username) = &user.username {
            out = out.with_username(username.clone());
        }
        if let Some(first) = &user.first_name {
            out = out.with_name(first.clone(), user.last_name.clone());
        }
        out
    }
}

#[derive(Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

#[derive(Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Serialize)]
struct SendMessageRequest {
    chat_id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    result: MessageResult,
}

#[derive(Deserialize)]
struct MessageResult {
    message_id: i64,
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Result<Self, BotError> {
        // Long polling holds requests open, so allow well past the poll timeout
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| BotError::Config(e.to_string()))?;

        Ok(Self {
            token: token.into(),
            client,
            info: BotInfo {
                id: "unknown".to_string(),
                name: "greenhouse-bot".to_string(),
                username: "greenhouse_bot".to_string(),
            },
        })
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Response {
            result: BotInfoResponse,
        }

        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let url = self.api_url("getMe");
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        self.info = BotInfo {
            id: data.result.id.to_string(),
            name: data.result.first_name,
            username: data.result.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            result: Vec<Update>,
        }

        let url = self.api_url("getUpdates");
        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string(), "callback_query".to_string()],
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result)
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
    }

    /// Convert an update into a domain message. Updates without text or callback data yield `None`.
    pub fn to_message(update: &Update, parser: &MessageParser) -> Option<entities::Message> {
        if let Some(msg) = &update.message {
            let text = msg.text.as_deref()?;
            let sender = msg.from.as_ref().map(entities::User::from);
            let message = parser
                .parse(msg.chat.id.to_string(), text, sender)
                .with_platform("telegram");
            return Some(message);
        }

        if let Some(cb) = &update.callback_query {
            let chat_id = cb
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(cb.from.id);
            let data = cb.data.clone().unwrap_or_default();
            let message = parser
                .parse_callback(chat_id.to_string(), cb.id.clone(), data, entities::User::from(&cb.from))
                .with_platform("telegram");
            return Some(message);
        }

        None
    }

    async fn post_message(&self, request: &SendMessageRequest) -> Result<String, BotError> {
        let url = self.api_url("sendMessage");
        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Telegram API error: {}", response.status())));
        }

        let data: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result.message_id.to_string())
    }

    /// Register the command menu with Telegram
    pub async fn register_commands(&self) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: &'static str,
            description: &'static str,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let commands = [
            ("start", "Start working with the bot"),
            ("help", "Show the list of commands"),
            ("auth", "Authorize with the password"),
            ("panel", "Show the control panel"),
            ("status", "Current system status"),
            ("moisture", "Current soil moisture"),
            ("light", "Current light level"),
            ("pump_on", "Turn the pump on"),
            ("pump_off", "Turn the pump off"),
            ("pump_time", "Run the pump for N seconds"),
            ("set_schedule", "Set the watering schedule"),
            ("get_schedule", "Show the watering schedule"),
            ("cancel_schedule", "Cancel the watering schedule"),
        ]
        .into_iter()
        .map(|(command, description)| Command { command, description })
        .collect();

        let url = self.api_url("setMyCommands");
        let request = SetMyCommandsRequest { commands };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("Failed to register commands: {}", error)));
        }

        tracing::info!("Registered bot commands with Telegram");
        Ok(())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting Telegram bot (token: {}...)", &self.token[..8.min(self.token.len())]);
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);

        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            reply_markup: None,
        };
        self.post_message(&request).await
    }

    async fn send_with_keyboard(&self, chat_id: &str, text: &str, buttons: Vec<Vec<KeyboardButton>>) -> Result<String, BotError> {
        tracing::debug!("Sending with keyboard to {}: {}", chat_id, text);

        let inline_keyboard = buttons
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|btn| InlineKeyboardButton {
                        text: btn.text,
                        callback_data: btn.callback_data,
                    })
                    .collect()
            })
            .collect();

        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            reply_markup: Some(InlineKeyboardMarkup { inline_keyboard }),
        };
        self.post_message(&request).await
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct AnswerRequest {
            callback_query_id: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<String>,
        }

        let url = self.api_url("answerCallbackQuery");
        let request = AnswerRequest {
            callback_query_id: callback_id.to_string(),
            text: text.map(|s| s.to_string()),
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Callback answer error: {}", response.status())));
        }

        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Content;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn text_update_becomes_command_message() {
        let parser = MessageParser::new("/");
        let u = update(r#"{
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": {"id": 42, "first_name": "Anna", "username": "grower"},
                "chat": {"id": 42},
                "text": "/pump_time 10"
            }
        }"#);

        let msg = TelegramAdapter::to_message(&u, &parser).unwrap();
        assert_eq!(msg.chat_id, "42");
        assert_eq!(msg.platform, "telegram");
        assert_eq!(msg.sender.as_ref().map(|s| s.display_name()), Some("Anna".to_string()));
        assert_eq!(
            msg.content,
            Content::Command {
                name: "pump_time".to_string(),
                args: vec!["10".to_string()],
            }
        );
    }

    #[test]
    fn callback_update_becomes_callback_message() {
        let parser = MessageParser::new("/");
        let u = update(r#"{
            "update_id": 11,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42},
                "message": {"message_id": 5, "chat": {"id": -100}},
                "data": "status"
            }
        }"#);

        let msg = TelegramAdapter::to_message(&u, &parser).unwrap();
        assert_eq!(msg.chat_id, "-100");
        assert_eq!(msg.sender.map(|s| s.id), Some("42".to_string()));
        assert_eq!(
            msg.content,
            Content::CallbackData {
                id: "cb-1".to_string(),
                data: "status".to_string(),
            }
        );
    }

    #[test]
    fn next_offset_keeps_current_when_empty() {
        assert_eq!(TelegramAdapter::get_next_offset(&[], 7), 7);
        let updates = vec![
            update(r#"{"update_id": 3}"#),
            update(r#"{"update_id": 5}"#),
        ];
        assert_eq!(TelegramAdapter::get_next_offset(&updates, 0), 6);
    }
}

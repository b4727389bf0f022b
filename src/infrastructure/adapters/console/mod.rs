//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use crate::domain::traits::{Bot, BotInfo, KeyboardButton};
use crate::application::errors::BotError;

/// Chat id and identity used for everything typed into the console
pub const CONSOLE_CHAT: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: CONSOLE_CHAT.to_string(),
                name: "greenhouse-bot".to_string(),
                username: CONSOLE_CHAT.to_string(),
            },
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Read one trimmed line; `None` at end of input
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(prompt.as_bytes()).await;
        let _ = stdout.flush().await;

        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    async fn send_with_keyboard(&self, _chat_id: &str, text: &str, buttons: Vec<Vec<KeyboardButton>>) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        for row in buttons {
            let row_text: Vec<String> = row
                .iter()
                .map(|b| format!("{} (/{})", b.text, b.callback_data))
                .collect();
            println!("  [Buttons] {}", row_text.join(" | "));
        }
        Ok("console_msg".to_string())
    }

    async fn answer_callback(&self, _callback_id: &str, _text: Option<&str>) -> Result<(), BotError> {
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

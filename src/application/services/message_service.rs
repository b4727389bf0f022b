use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::services::CommandService;
use crate::domain::entities::{Content, Invocation, Message, User};
use crate::domain::traits::{Bot, Reply};

/// Bridges a chat transport and the command router
pub struct MessageService<B: Bot> {
    bot: Arc<B>,
    commands: Arc<CommandService>,
}

impl<B: Bot> Clone for MessageService<B> {
    fn clone(&self) -> Self {
        Self {
            bot: Arc::clone(&self.bot),
            commands: Arc::clone(&self.commands),
        }
    }
}

impl<B: Bot> MessageService<B> {
    pub fn new(bot: Arc<B>, commands: Arc<CommandService>) -> Self {
        Self { bot, commands }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Route a message through the command service and return the reply, if any
    pub async fn process(&self, message: Message) -> Result<Option<Reply>, BotError> {
        let sender = message
            .sender
            .clone()
            .unwrap_or_else(|| User::new(message.chat_id.clone()));

        let invocation = match message.content {
            Content::Command { name, args } => Invocation::text(&message.chat_id, sender, name, args),
            Content::CallbackData { id, data } => {
                if let Err(e) = self.bot.answer_callback(&id, None).await {
                    tracing::warn!("Failed to answer callback {}: {}", id, e);
                }
                Invocation::button(&message.chat_id, sender, data)
            }
            Content::Text(_) => {
                tracing::debug!("Ignoring non-command {} message in chat {}", message.message_type.as_str(), message.chat_id);
                return Ok(None);
            }
        };

        tracing::debug!(
            "Processing {} from {} received at {}",
            message.message_type.as_str(),
            message.platform,
            message.timestamp
        );

        Ok(Some(self.commands.handle(&invocation).await))
    }

    /// Process a message and deliver the reply to its chat
    pub async fn handle(&self, message: Message) -> Result<(), BotError> {
        let chat_id = message.chat_id.clone();
        if let Some(reply) = self.process(message).await? {
            let preview: String = reply.text.chars().take(100).collect();
            tracing::info!("Sending response to chat_id {}: {}", chat_id, preview);
            self.bot.send_reply(&chat_id, reply).await?;
        }
        Ok(())
    }
}

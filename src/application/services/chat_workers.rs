//! Per-chat workers - Messages from one chat run in order, chats run concurrently

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::application::messaging::reply;
use crate::domain::entities::Message;
use crate::domain::traits::Bot;
use super::MessageService;

/// Messages buffered per chat before the chat is told to slow down
const CHAT_QUEUE: usize = 32;

/// A worker with nothing to do for this long exits
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

pub struct ChatWorkers<B: Bot + 'static> {
    service: MessageService<B>,
    workers: HashMap<String, mpsc::Sender<Message>>,
    idle_timeout: Duration,
}

impl<B: Bot + 'static> ChatWorkers<B> {
    pub fn new(service: MessageService<B>) -> Self {
        Self {
            service,
            workers: HashMap::new(),
            idle_timeout: IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Queue a message on its chat's worker, spawning the worker on first contact
    pub fn dispatch(&mut self, message: Message) {
        let chat_id = message.chat_id.clone();

        let message = match self.workers.get(&chat_id) {
            Some(tx) => match tx.try_send(message) {
                Ok(()) => return,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Chat {} has too many pending commands, rejecting one", chat_id);
                    self.reject_busy(chat_id);
                    return;
                }
                Err(TrySendError::Closed(message)) => message,
            },
            None => message,
        };

        self.workers.retain(|_, tx| !tx.is_closed());

        let (tx, rx) = mpsc::channel(CHAT_QUEUE);
        tokio::spawn(Self::run(self.service.clone(), chat_id.clone(), rx, self.idle_timeout));
        if tx.try_send(message).is_err() {
            tracing::error!("Failed to queue message for new worker of chat {}", chat_id);
        }
        self.workers.insert(chat_id, tx);
    }

    /// Number of chats with a live worker
    pub fn len(&self) -> usize {
        self.workers.values().filter(|tx| !tx.is_closed()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reject_busy(&self, chat_id: String) {
        let service = self.service.clone();
        tokio::spawn(async move {
            if let Err(e) = service.bot().send_message(&chat_id, reply::BUSY).await {
                tracing::error!("Failed to deliver busy notice to chat {}: {}", chat_id, e);
            }
        });
    }

    async fn run(service: MessageService<B>, chat_id: String, mut rx: mpsc::Receiver<Message>, idle_timeout: Duration) {
        tracing::debug!("Worker started for chat {}", chat_id);
        loop {
            match tokio::time::timeout(idle_timeout, rx.recv()).await {
                Ok(Some(message)) => Self::deliver(&service, &chat_id, message).await,
                Ok(None) => break,
                Err(_) => {
                    // Closing first makes dispatch respawn; anything already queued still runs
                    rx.close();
                    while let Some(message) = rx.recv().await {
                        Self::deliver(&service, &chat_id, message).await;
                    }
                    break;
                }
            }
        }
        tracing::debug!("Worker stopped for chat {}", chat_id);
    }

    async fn deliver(service: &MessageService<B>, chat_id: &str, message: Message) {
        if let Err(e) = service.handle(message).await {
            tracing::error!("Failed to deliver reply to chat {}: {}", chat_id, e);
        }
    }
}

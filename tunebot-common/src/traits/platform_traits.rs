use async_trait::async_trait;

use crate::error::Error;
use crate::models::{BotCommand, ChatId, ChatMessageEvent, OutgoingMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Error(String),
}

#[async_trait]
pub trait PlatformAuth {
    async fn authenticate(&mut self) -> Result<(), Error>;
}

#[async_trait]
pub trait PlatformIntegration: PlatformAuth {
    async fn connect(&mut self) -> Result<(), Error>;
    async fn disconnect(&mut self) -> Result<(), Error>;
    async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<(), Error>;
    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error>;
}

#[async_trait]
pub trait ChatPlatform: PlatformIntegration + Send + Sync {
    /// Awaits the next inbound text message; `None` once the platform is shut down.
    async fn next_message_event(&self) -> Option<ChatMessageEvent>;

    /// Publishes the command menu shown by chat clients.
    async fn publish_commands(&self, commands: &[BotCommand]) -> Result<(), Error>;

    /// The bot's own username, known after `connect`.
    fn bot_username(&self) -> Option<String>;
}

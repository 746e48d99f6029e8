//! src/platforms/telegram/runtime.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tunebot_common::models::{BotCommand, ChatId, ChatMessageEvent, OutgoingMessage};
use tunebot_common::traits::{ChatPlatform, ConnectionStatus, PlatformAuth, PlatformIntegration};

use super::client::{TelegramBotClient, TelegramUser, Update};
use crate::Error;

pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Exponential delay between failed polls, reset by the next success.
pub(crate) struct Backoff {
    attempt: u32,
}

impl Backoff {
    pub(crate) fn new() -> Self {
        Self { attempt: 0 }
    }

    pub(crate) fn next(&mut self) -> Duration {
        let delay = BACKOFF_BASE.saturating_mul(2u32.saturating_pow(self.attempt));
        self.attempt = self.attempt.saturating_add(1);
        delay.min(BACKOFF_MAX)
    }

    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Turns a raw update into a chat event. Non-text updates and messages
/// sent by other bots are dropped.
pub(crate) fn message_event(update: Update) -> Option<ChatMessageEvent> {
    let msg = update.message?;
    let text = msg.text?;
    if msg.from.as_ref().is_some_and(|u| u.is_bot) {
        return None;
    }
    let user_name = msg
        .from
        .map(|u| u.username.unwrap_or(u.first_name))
        .unwrap_or_default();
    Some(ChatMessageEvent {
        chat_id: msg.chat.id,
        message_id: msg.message_id,
        user_name,
        text,
    })
}

async fn poll_loop(client: Arc<TelegramBotClient>, tx: Sender<ChatMessageEvent>, timeout_secs: u64) {
    info!("(TelegramPlatform) polling for updates");
    let mut offset: Option<i64> = None;
    let mut backoff = Backoff::new();

    loop {
        match client.get_updates(offset, timeout_secs).await {
            Ok(updates) => {
                backoff.reset();
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(evt) = message_event(update) {
                        debug!("(TelegramPlatform) message from {} in chat {}", evt.user_name, evt.chat_id);
                        if tx.send(evt).await.is_err() {
                            info!("(TelegramPlatform) receiver dropped, poll loop ending");
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                let delay = backoff.next();
                warn!("(TelegramPlatform) getUpdates failed: {e}; retrying in {}s", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        }
    }
}

pub struct TelegramPlatform {
    client: Arc<TelegramBotClient>,
    pub connection_status: ConnectionStatus,
    bot_user: Option<TelegramUser>,
    poll_timeout_secs: u64,

    rx: Mutex<Option<Receiver<ChatMessageEvent>>>,
    poll_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl TelegramPlatform {
    pub fn new(client: TelegramBotClient) -> Self {
        Self::with_poll_timeout(client, DEFAULT_POLL_TIMEOUT_SECS)
    }

    pub fn with_poll_timeout(client: TelegramBotClient, poll_timeout_secs: u64) -> Self {
        Self {
            client: Arc::new(client),
            connection_status: ConnectionStatus::Disconnected,
            bot_user: None,
            poll_timeout_secs,
            rx: Mutex::new(None),
            poll_task: std::sync::Mutex::new(None),
        }
    }

    /// Stops the poll loop. Once buffered events are consumed,
    /// `next_message_event` returns `None`.
    pub fn shutdown(&self) {
        let handle = match self.poll_task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(h) = handle {
            h.abort();
            info!("(TelegramPlatform) poll loop stopped");
        }
    }
}

#[async_trait]
impl PlatformAuth for TelegramPlatform {
    async fn authenticate(&mut self) -> Result<(), Error> {
        let me = self
            .client
            .get_me()
            .await
            .map_err(|e| Error::Auth(format!("Telegram rejected the bot token: {e}")))?;
        info!(
            "(TelegramPlatform) authenticated as @{} (ID={})",
            me.username.as_deref().unwrap_or("?"),
            me.id
        );
        self.bot_user = Some(me);
        Ok(())
    }
}

#[async_trait]
impl PlatformIntegration for TelegramPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(TelegramPlatform) Already connected => skipping");
            return Ok(());
        }
        if self.bot_user.is_none() {
            if let Err(e) = self.authenticate().await {
                error!("(TelegramPlatform) {e}");
                self.connection_status = ConnectionStatus::Error(e.to_string());
                return Err(e);
            }
        }

        let (tx, rx) = channel::<ChatMessageEvent>(1000);
        *self.rx.lock().await = Some(rx);

        let handle = tokio::spawn(poll_loop(self.client.clone(), tx, self.poll_timeout_secs));
        match self.poll_task.lock() {
            Ok(mut guard) => *guard = Some(handle),
            Err(poisoned) => *poisoned.into_inner() = Some(handle),
        }

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.shutdown();
        *self.rx.lock().await = None;
        self.connection_status = ConnectionStatus::Disconnected;
        Ok(())
    }

    async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<(), Error> {
        self.client.send_message(chat_id, message).await
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn next_message_event(&self) -> Option<ChatMessageEvent> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }

    async fn publish_commands(&self, commands: &[BotCommand]) -> Result<(), Error> {
        self.client.set_my_commands(commands).await
    }

    fn bot_username(&self) -> Option<String> {
        self.bot_user.as_ref().and_then(|u| u.username.clone())
    }
}

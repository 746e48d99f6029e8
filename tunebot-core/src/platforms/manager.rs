// File: src/platforms/manager.rs

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use tunebot_common::models::{ChatMessageEvent, CommandInvocation};
use tunebot_common::traits::ChatPlatform;

use crate::services::CommandDispatcher;

/// BotRuntime owns a connected chat platform and funnels every inbound
/// command into the [`CommandDispatcher`], sending back whatever it replies.
/// It does not interpret commands itself.
pub struct BotRuntime<P: ChatPlatform + 'static> {
    platform: Arc<P>,
    dispatcher: Arc<CommandDispatcher>,
}

impl<P: ChatPlatform + 'static> BotRuntime<P> {
    pub fn new(platform: Arc<P>, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { platform, dispatcher }
    }

    /// Runs until the platform stops producing events.
    ///
    /// Each command is handled on its own task, so a slow lookup in one chat
    /// does not hold up the others.
    pub async fn run(&self) {
        let profile = self.dispatcher.profile();
        if let Err(e) = self.platform.publish_commands(&self.dispatcher.commands()).await {
            warn!("[{profile}] Could not publish command menu: {e}");
        }
        let bot_username = self.platform.bot_username();
        info!("🚀 {} is running...", profile.display_name());

        let mut tasks = JoinSet::new();
        while let Some(event) = self.platform.next_message_event().await {
            let invocation = match CommandInvocation::parse(&event.text) {
                Some(inv) => inv,
                None => continue,
            };
            if !invocation.is_addressed_to(bot_username.as_deref()) {
                debug!("Ignoring /{} addressed to another bot", invocation.name);
                continue;
            }

            let platform = Arc::clone(&self.platform);
            let dispatcher = Arc::clone(&self.dispatcher);
            tasks.spawn(handle_command(platform, dispatcher, event, invocation));

            while let Some(done) = tasks.try_join_next() {
                if let Err(e) = done {
                    error!("Command task failed: {e}");
                }
            }
        }

        while let Some(done) = tasks.join_next().await {
            if let Err(e) = done {
                error!("Command task failed: {e}");
            }
        }
        info!("[{profile}] event loop ended.");
    }
}

async fn handle_command<P: ChatPlatform>(
    platform: Arc<P>,
    dispatcher: Arc<CommandDispatcher>,
    event: ChatMessageEvent,
    invocation: CommandInvocation,
) {
    info!(
        "/{} from {} in chat {}",
        invocation.name, event.user_name, event.chat_id
    );
    let reply = match dispatcher
        .dispatch(&invocation.name, &invocation.args, event.chat_id)
        .await
    {
        Some(r) => r.replying_to(event.message_id),
        None => return,
    };
    if let Err(e) = platform.send_message(event.chat_id, &reply).await {
        error!("Failed to send reply to chat {}: {e}", event.chat_id);
    }
}

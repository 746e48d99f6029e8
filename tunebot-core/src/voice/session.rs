// File: tunebot-core/src/voice/session.rs

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{error, info, warn};

use tunebot_common::models::{AudioSource, ChatId, VoiceState};
use tunebot_common::traits::VoiceTransport;

use crate::Error;

/// Per-chat voice state on top of a [`VoiceTransport`].
///
/// Idle chats have no entry in the map. Every transition goes through the
/// map's entry API, so it is atomic per chat: of two concurrent `start`
/// calls for one chat, exactly one moves it to `Joining` and the other is
/// rejected.
pub struct VoiceSessionManager {
    transport: Arc<dyn VoiceTransport>,
    states: DashMap<ChatId, VoiceState>,
}

impl VoiceSessionManager {
    pub fn new(transport: Arc<dyn VoiceTransport>) -> Self {
        Self {
            transport,
            states: DashMap::new(),
        }
    }

    pub fn state(&self, chat_id: ChatId) -> VoiceState {
        self.states.get(&chat_id).map(|s| *s).unwrap_or_default()
    }

    /// Chats that currently have a stream playing.
    pub fn active_chats(&self) -> Vec<ChatId> {
        self.states
            .iter()
            .filter(|e| *e.value() == VoiceState::Playing)
            .map(|e| *e.key())
            .collect()
    }

    /// Moves `chat_id` from `from` to `to`; on mismatch returns the current state.
    fn transition(&self, chat_id: ChatId, from: VoiceState, to: VoiceState) -> Result<(), VoiceState> {
        match self.states.entry(chat_id) {
            Entry::Occupied(mut e) => {
                let current = *e.get();
                if current == from {
                    e.insert(to);
                    Ok(())
                } else {
                    Err(current)
                }
            }
            Entry::Vacant(v) => {
                if from == VoiceState::Idle {
                    v.insert(to);
                    Ok(())
                } else {
                    Err(VoiceState::Idle)
                }
            }
        }
    }

    /// Drops a `Playing` entry whose call has already ended on the transport
    /// side, so the chat counts as Idle again.
    async fn reap_ended(&self, chat_id: ChatId) {
        if self.state(chat_id) != VoiceState::Playing || self.transport.is_active(chat_id).await {
            return;
        }
        if self
            .states
            .remove_if(&chat_id, |_, s| *s == VoiceState::Playing)
            .is_some()
        {
            info!("Voice session in chat {chat_id} ended on its own");
        }
    }

    /// Idle → Joining → Playing. Any failure leaves the chat Idle. A chat
    /// whose previous stream already ended is treated as Idle.
    pub async fn start(&self, chat_id: ChatId, source: &AudioSource) -> Result<(), Error> {
        self.reap_ended(chat_id).await;
        self.transition(chat_id, VoiceState::Idle, VoiceState::Joining)
            .map_err(|current| {
                warn!("Refusing to start playback in chat {chat_id}: session is {current}");
                Error::Join(format!("voice session in chat {chat_id} is {current}"))
            })?;

        match self.transport.join(chat_id, source).await {
            Ok(()) => {
                self.states.insert(chat_id, VoiceState::Playing);
                info!("Voice session in chat {chat_id} is playing");
                Ok(())
            }
            Err(e) => {
                self.states.remove(&chat_id);
                error!("Failed to join voice chat: {e}");
                Err(match e {
                    Error::Join(_) => e,
                    other => Error::Join(other.to_string()),
                })
            }
        }
    }

    /// Playing → Leaving → Idle. The chat ends up Idle even if the transport
    /// refuses to leave.
    pub async fn stop(&self, chat_id: ChatId) -> Result<(), Error> {
        self.transition(chat_id, VoiceState::Playing, VoiceState::Leaving)
            .map_err(|current| Error::Leave(format!("no active stream in chat {chat_id} ({current})")))?;

        let result = self.transport.leave(chat_id).await;
        self.states.remove(&chat_id);

        match result {
            Ok(()) => {
                info!("Voice session in chat {chat_id} stopped");
                Ok(())
            }
            Err(e) => {
                error!("Failed to leave voice chat: {e}");
                Err(match e {
                    Error::Leave(_) => e,
                    other => Error::Leave(other.to_string()),
                })
            }
        }
    }

    /// Leaves every chat that is still playing. Used on process shutdown.
    pub async fn shutdown(&self) {
        for chat_id in self.active_chats() {
            if let Err(e) = self.stop(chat_id).await {
                warn!("Error leaving chat {chat_id} during shutdown: {e}");
            }
        }
    }
}

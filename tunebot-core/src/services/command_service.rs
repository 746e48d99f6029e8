use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use tunebot_common::models::{BotCommand, BotProfile, ChatId, OutgoingMessage, TrackMatch};
use tunebot_common::traits::{AudioLocator, TrackResolver};

use crate::services::replies;
use crate::voice::VoiceSessionManager;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Song,
    Play,
    Stop,
    Help,
}

/// Services only the streaming bot has.
pub struct PlaybackServices {
    pub locator: Arc<dyn AudioLocator>,
    pub voice: Arc<VoiceSessionManager>,
}

/// Maps command names to handlers and turns service outcomes into replies.
///
/// Lookup is an exact match on the command name. Commands that are not
/// registered for this bot produce no reply at all.
pub struct CommandDispatcher {
    profile: BotProfile,
    resolver: Arc<dyn TrackResolver>,
    playback: Option<PlaybackServices>,
    handlers: HashMap<&'static str, CommandKind>,
}

impl CommandDispatcher {
    /// Search-only bot: `/song`.
    pub fn listen2play(resolver: Arc<dyn TrackResolver>) -> Self {
        let handlers = HashMap::from([
            ("song", CommandKind::Song),
            ("start", CommandKind::Help),
            ("help", CommandKind::Help),
        ]);
        debug!("Initializing CommandDispatcher for listen2play");
        Self {
            profile: BotProfile::Listen2Play,
            resolver,
            playback: None,
            handlers,
        }
    }

    /// Streaming bot: `/play` and `/stop`.
    pub fn melody4stream(
        resolver: Arc<dyn TrackResolver>,
        locator: Arc<dyn AudioLocator>,
        voice: Arc<VoiceSessionManager>,
    ) -> Self {
        let handlers = HashMap::from([
            ("play", CommandKind::Play),
            ("stop", CommandKind::Stop),
            ("start", CommandKind::Help),
            ("help", CommandKind::Help),
        ]);
        debug!("Initializing CommandDispatcher for melody4stream");
        Self {
            profile: BotProfile::Melody4Stream,
            resolver,
            playback: Some(PlaybackServices { locator, voice }),
            handlers,
        }
    }

    pub fn profile(&self) -> BotProfile {
        self.profile
    }

    /// Command menu published to the chat platform.
    pub fn commands(&self) -> Vec<BotCommand> {
        match self.profile {
            BotProfile::Listen2Play => vec![
                BotCommand::new("song", "Find a song on Spotify"),
                BotCommand::new("help", "Show what this bot can do"),
            ],
            BotProfile::Melody4Stream => vec![
                BotCommand::new("play", "Stream a song into this chat's voice chat"),
                BotCommand::new("stop", "Stop playback and leave the voice chat"),
                BotCommand::new("help", "Show what this bot can do"),
            ],
        }
    }

    /// Handles one command. `command` may carry its leading `/`.
    /// Returns `None` when the command is not handled by this bot.
    pub async fn dispatch(
        &self,
        command: &str,
        args: &[String],
        chat_id: ChatId,
    ) -> Option<OutgoingMessage> {
        let name = command.strip_prefix('/').unwrap_or(command);
        let kind = match self.handlers.get(name) {
            Some(k) => *k,
            None => {
                debug!("No handler registered for '{name}'");
                return None;
            }
        };
        debug!("Dispatching '{name}' in chat {chat_id} with {} arg(s)", args.len());

        let reply = match kind {
            CommandKind::Song => self.handle_song(args).await,
            CommandKind::Play => {
                let playback = self.playback.as_ref()?;
                self.handle_play(playback, args, chat_id).await
            }
            CommandKind::Stop => {
                let playback = self.playback.as_ref()?;
                Self::handle_stop(playback, chat_id).await
            }
            CommandKind::Help => OutgoingMessage::plain(self.help_text()),
        };
        Some(reply)
    }

    async fn handle_song(&self, args: &[String]) -> OutgoingMessage {
        if args.is_empty() {
            return OutgoingMessage::plain(replies::SONG_USAGE);
        }
        let query = args.join(" ");

        let text = match self.resolver.resolve(&query).await {
            Ok(Some(track)) => replies::song_found(&track),
            Ok(None) => replies::NO_SONG_FOUND.to_string(),
            Err(e) => resolver_error_reply(&e).to_string(),
        };
        OutgoingMessage::plain(text)
    }

    async fn handle_play(
        &self,
        playback: &PlaybackServices,
        args: &[String],
        chat_id: ChatId,
    ) -> OutgoingMessage {
        if args.is_empty() {
            return OutgoingMessage::plain(replies::PLAY_USAGE);
        }
        let query = args.join(" ");

        // 1) Metadata
        let track: TrackMatch = match self.resolver.resolve(&query).await {
            Ok(Some(t)) => t,
            Ok(None) => return OutgoingMessage::plain(replies::NO_SONG_FOUND),
            Err(e) => return OutgoingMessage::plain(resolver_error_reply(&e)),
        };

        // 2) Playable audio. A failed lookup and an empty one get the same
        //    reply; only the former is logged as an error.
        let source = match playback.locator.locate(&track.title, &track.artist).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                info!("No audio source for '{}' by '{}'", track.title, track.artist);
                return OutgoingMessage::plain(replies::NO_AUDIO_SOURCE);
            }
            Err(e) => {
                error!("Audio lookup failed for '{}' by '{}': {e}", track.title, track.artist);
                return OutgoingMessage::plain(replies::NO_AUDIO_SOURCE);
            }
        };

        // 3) Voice chat
        match playback.voice.start(chat_id, &source).await {
            Ok(()) => OutgoingMessage::markdown(replies::now_playing(&track)),
            Err(_) => OutgoingMessage::plain(replies::JOIN_FAILED),
        }
    }

    async fn handle_stop(playback: &PlaybackServices, chat_id: ChatId) -> OutgoingMessage {
        match playback.voice.stop(chat_id).await {
            Ok(()) => OutgoingMessage::plain(replies::STOPPED),
            Err(e) => {
                debug!("/stop in chat {chat_id} failed: {e}");
                OutgoingMessage::plain(replies::STOP_FAILED)
            }
        }
    }

    fn help_text(&self) -> String {
        match self.profile {
            BotProfile::Listen2Play => format!(
                "👋 Hi! I'm {}.\nSend /song <song name> and I'll find it on Spotify.",
                self.profile.display_name()
            ),
            BotProfile::Melody4Stream => format!(
                "👋 Hi! I'm {}.\n/play <song name> – stream a song into this chat's voice chat\n/stop – stop playback",
                self.profile.display_name()
            ),
        }
    }
}

fn resolver_error_reply(e: &Error) -> &'static str {
    match e {
        Error::Auth(_) => replies::AUTH_FAILED,
        _ => replies::SEARCH_FAILED,
    }
}

// File: tunebot-common/src/models/mod.rs
pub mod command;
pub mod credential;
pub mod platform;
pub mod track;
pub mod voice;

pub use command::{BotCommand, CommandInvocation};
pub use credential::Credentials;
pub use platform::{BotProfile, ChatMessageEvent, OutgoingMessage, ParseMode};
pub use track::{AccessToken, AudioSource, TrackMatch};
pub use voice::{ChatId, VoiceState};

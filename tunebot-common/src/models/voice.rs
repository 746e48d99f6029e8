use std::fmt;

/// Telegram chat identifier (negative for groups and supergroups).
pub type ChatId = i64;

/// Lifecycle of the voice stream for a single chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Joining,
    Playing,
    Leaving,
}

impl fmt::Display for VoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceState::Idle => write!(f, "idle"),
            VoiceState::Joining => write!(f, "joining"),
            VoiceState::Playing => write!(f, "playing"),
            VoiceState::Leaving => write!(f, "leaving"),
        }
    }
}

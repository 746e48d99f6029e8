// File: tunebot-common/src/models/platform.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::models::voice::ChatId;

/// Which of the two bots a process runs as.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BotProfile {
    /// Search-only bot (`/song`).
    Listen2Play,
    /// Voice-chat streaming bot (`/play`, `/stop`).
    Melody4Stream,
}

impl BotProfile {
    pub fn display_name(&self) -> &'static str {
        match self {
            BotProfile::Listen2Play => "Listen2PlayBot",
            BotProfile::Melody4Stream => "Melody4StreamBot",
        }
    }

    /// Environment variable holding this bot's Telegram token.
    pub fn token_env_var(&self) -> &'static str {
        match self {
            BotProfile::Listen2Play => "LISTEN2PLAY_BOT_TOKEN",
            BotProfile::Melody4Stream => "MELODY4STREAM_BOT_TOKEN",
        }
    }
}

impl fmt::Display for BotProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotProfile::Listen2Play => write!(f, "listen2play"),
            BotProfile::Melody4Stream => write!(f, "melody4stream"),
        }
    }
}

impl FromStr for BotProfile {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "listen2play" => Ok(BotProfile::Listen2Play),
            "melody4stream" => Ok(BotProfile::Melody4Stream),
            _ => Err(format!("Unknown bot profile: {}", s)),
        }
    }
}

/// Inbound text message as delivered by the chat platform runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessageEvent {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub user_name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Plain,
    /// Telegram `MarkdownV2`; reserved characters in the text must be escaped.
    MarkdownV2,
}

impl ParseMode {
    /// Value of the Bot API `parse_mode` field, if any.
    pub fn as_api_str(&self) -> Option<&'static str> {
        match self {
            ParseMode::Plain => None,
            ParseMode::MarkdownV2 => Some("MarkdownV2"),
        }
    }
}

/// A reply produced by the command layer.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: ParseMode,
    /// Message this one answers, so the reply is threaded in the chat.
    pub reply_to: Option<i64>,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
            reply_to: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::MarkdownV2,
            reply_to: None,
        }
    }

    pub fn replying_to(mut self, message_id: i64) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

//! Seams between the command layer and the external services it drives.
//!
//! Each trait has exactly one production implementation in `tunebot-core`;
//! the `mocks` feature generates mockall doubles for test suites.

use async_trait::async_trait;

use crate::error::Error;
use crate::models::{AccessToken, AudioSource, ChatId, TrackMatch};

#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token for the metadata service, or `Error::Auth`.
    async fn fetch_token(&self) -> Result<AccessToken, Error>;
}

#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// `Ok(None)` means the search ran and found nothing.
    /// Token failures come back as `Error::Auth`, search failures as `Error::Search`.
    async fn resolve(&self, query: &str) -> Result<Option<TrackMatch>, Error>;
}

#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait AudioLocator: Send + Sync {
    /// `Ok(None)` means the lookup ran and had no candidate;
    /// `Error::Lookup` means the lookup itself failed.
    async fn locate(&self, title: &str, artist: &str) -> Result<Option<AudioSource>, Error>;
}

/// The third-party voice-call client.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    async fn join(&self, chat_id: ChatId, source: &AudioSource) -> Result<(), Error>;
    async fn leave(&self, chat_id: ChatId) -> Result<(), Error>;
    /// Whether the call joined for `chat_id` is still live. A call can end
    /// without `leave`, e.g. when the stream runs out.
    async fn is_active(&self, chat_id: ChatId) -> bool;
}

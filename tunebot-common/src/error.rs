// ================================================================
// File: tunebot-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Token exchange with the metadata service failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The metadata search call itself failed (not the same as "no results").
    #[error("Search error: {0}")]
    Search(String),

    /// The media-lookup extractor crashed, timed out or returned garbage.
    #[error("Audio lookup error: {0}")]
    Lookup(String),

    #[error("Voice join error: {0}")]
    Join(String),

    #[error("Voice leave error: {0}")]
    Leave(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Building the HTTP client failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

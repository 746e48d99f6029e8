//! Spotify Web API: client-credentials auth and track search.

pub mod auth;
pub mod client;

pub use auth::{CachedTokenProvider, SpotifyTokenProvider};
pub use client::SpotifyTrackResolver;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";

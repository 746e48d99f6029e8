use std::fmt;

/// Secrets loaded once at process start and read-only afterwards.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub bot_token: String,

    /// Only the stream bot needs these; they are handed to the voice bridge.
    pub telegram_api_id: Option<i32>,
    pub telegram_api_hash: Option<String>,
}

impl Credentials {
    pub fn has_spotify(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }
}

// Manual impl so secrets never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("spotify_client_id", &self.spotify_client_id)
            .field("spotify_client_secret", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("telegram_api_id", &self.telegram_api_id)
            .field("telegram_api_hash", &self.telegram_api_hash.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

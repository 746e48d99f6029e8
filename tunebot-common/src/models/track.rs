use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token handed out by the metadata service's token endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// True when the token is expired or will be within `margin`.
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_at - Utc::now() <= margin
    }
}

/// Best search hit for a free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMatch {
    pub title: String,
    pub artist: String,
    pub external_link: String,
}

impl TrackMatch {
    /// Query string used when asking the media-lookup service for audio.
    pub fn audio_query(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// Directly playable stream. These URLs expire quickly, so the value is
/// passed straight to the voice transport and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub stream_url: String,
}

// File: tunebot-core/src/spotify/auth.rs
//
// Client-credentials token exchange against the Spotify accounts service,
// plus the caching wrapper the bots actually use.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use tunebot_common::models::{AccessToken, Credentials};
use tunebot_common::traits::TokenProvider;

use crate::http::endpoint;
use crate::Error;

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// A cached token is refreshed once it is this close to expiry.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct SpotifyTokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Performs one token exchange per call. No retry, no caching.
pub struct SpotifyTokenProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyTokenProvider {
    pub fn new(http: reqwest::Client, accounts_base_url: &str, credentials: &Credentials) -> Self {
        Self {
            http,
            token_url: endpoint(accounts_base_url, "/api/token"),
            client_id: credentials.spotify_client_id.clone(),
            client_secret: credentials.spotify_client_secret.clone(),
        }
    }
}

#[async_trait]
impl TokenProvider for SpotifyTokenProvider {
    async fn fetch_token(&self) -> Result<AccessToken, Error> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let result: Result<AccessToken, Error> = async {
            let resp = self
                .http
                .post(&self.token_url)
                .form(&params)
                .send()
                .await
                .map_err(|e| Error::Auth(format!("HTTP error requesting token: {e}")))?
                .error_for_status()
                .map_err(|e| Error::Auth(format!("Spotify token endpoint error: {e}")))?
                .json::<SpotifyTokenResponse>()
                .await
                .map_err(|e| Error::Auth(format!("Parse error on token JSON: {e}")))?;

            let value = resp
                .access_token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| Error::Auth("Token response has no access_token".into()))?;
            let expires_in = resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);

            Ok(AccessToken::new(value, Utc::now() + Duration::seconds(expires_in)))
        }
        .await;

        match &result {
            Ok(_) => info!("🔑 Spotify token fetched successfully."),
            Err(e) => error!("Failed to get Spotify token: {e}"),
        }
        result
    }
}

/// Reuses a token until it nears expiry.
///
/// The mutex is held across the refresh, so concurrent callers wait for the
/// single in-flight exchange instead of each starting their own. Failures are
/// not cached.
pub struct CachedTokenProvider {
    inner: Arc<dyn TokenProvider>,
    cached: Mutex<Option<AccessToken>>,
    refresh_margin: Duration,
}

impl CachedTokenProvider {
    pub fn new(inner: Arc<dyn TokenProvider>) -> Self {
        Self::with_margin(inner, Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS))
    }

    pub fn with_margin(inner: Arc<dyn TokenProvider>, refresh_margin: Duration) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
            refresh_margin,
        }
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn fetch_token(&self) -> Result<AccessToken, Error> {
        let mut guard = self.cached.lock().await;

        if let Some(token) = guard.as_ref() {
            if !token.expires_within(self.refresh_margin) {
                return Ok(token.clone());
            }
            debug!("Cached Spotify token expires at {} – refreshing", token.expires_at);
        }

        let fresh = self.inner.fetch_token().await?;
        *guard = Some(fresh.clone());
        Ok(fresh)
    }
}

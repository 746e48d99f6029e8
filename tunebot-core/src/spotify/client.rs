// File: tunebot-core/src/spotify/client.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};

use tunebot_common::models::TrackMatch;
use tunebot_common::traits::{TokenProvider, TrackResolver};

use crate::http::endpoint;
use crate::Error;

const OPEN_SPOTIFY_TRACK: &str = "https://open.spotify.com/track";

/// JSON shape for "GET /v1/search?type=track".
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistItem>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl TrackItem {
    fn into_match(self) -> Result<TrackMatch, Error> {
        let external_link = match (self.external_urls.spotify, self.id) {
            (Some(url), _) => url,
            (None, Some(id)) => format!("{OPEN_SPOTIFY_TRACK}/{id}"),
            (None, None) => {
                return Err(Error::Search(format!("Track '{}' has no Spotify link", self.name)));
            }
        };
        let artist = self
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| "Unknown artist".to_string());

        Ok(TrackMatch {
            title: self.name,
            artist,
            external_link,
        })
    }
}

/// Resolves free text to the single highest-ranked Spotify track.
pub struct SpotifyTrackResolver {
    http: reqwest::Client,
    search_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SpotifyTrackResolver {
    pub fn new(http: reqwest::Client, api_base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            search_url: endpoint(api_base_url, "/v1/search"),
            tokens,
        }
    }

    async fn search(&self, bearer: &str, query: &str) -> Result<Option<TrackMatch>, Error> {
        let body = self
            .http
            .get(&self.search_url)
            .bearer_auth(bearer)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| Error::Search(format!("HTTP error searching: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Search(format!("Spotify search endpoint error: {e}")))?
            .json::<SearchResponse>()
            .await
            .map_err(|e| Error::Search(format!("Parse error on search JSON: {e}")))?;

        // Highest-ranked result wins; no secondary scoring.
        match body.tracks.and_then(|page| page.items.into_iter().next()) {
            Some(item) => item.into_match().map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TrackResolver for SpotifyTrackResolver {
    async fn resolve(&self, query: &str) -> Result<Option<TrackMatch>, Error> {
        let token = self.tokens.fetch_token().await?;

        info!("Searching for song: {query}");
        let result = self.search(&token.value, query).await;
        match &result {
            Ok(Some(track)) => debug!("Best match for '{query}': {} by {}", track.title, track.artist),
            Ok(None) => debug!("No Spotify results for '{query}'"),
            Err(e) => error!("Failed to search for song: {e}"),
        }
        result
    }
}

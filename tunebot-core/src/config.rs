//! Process configuration: credentials from the environment plus the
//! endpoint / tool overrides gathered by the CLI.

use std::time::Duration;

use tracing::warn;

use tunebot_common::models::{BotProfile, Credentials};

use crate::audio::ytdlp::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_YTDLP_PROGRAM};
use crate::platforms::telegram::client::DEFAULT_API_URL as DEFAULT_TELEGRAM_API_URL;
use crate::spotify::{DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL as DEFAULT_SPOTIFY_API_URL};
use crate::voice::bridge::{DEFAULT_BRIDGE_PROGRAM, DEFAULT_JOIN_TIMEOUT};
use crate::Error;

pub const SPOTIFY_CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const TELEGRAM_API_ID_VAR: &str = "TELEGRAM_API_ID";
pub const TELEGRAM_API_HASH_VAR: &str = "TELEGRAM_API_HASH";

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub spotify_accounts_url: String,
    pub spotify_api_url: String,
    pub telegram_api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            spotify_accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            spotify_api_url: DEFAULT_SPOTIFY_API_URL.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

/// External programs the stream bot shells out to.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub ytdlp_program: String,
    pub lookup_timeout: Duration,
    pub voice_bridge_program: String,
    pub join_timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ytdlp_program: DEFAULT_YTDLP_PROGRAM.to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            voice_bridge_program: DEFAULT_BRIDGE_PROGRAM.to_string(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub profile: BotProfile,
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub tools: ToolConfig,
}

impl BotConfig {
    pub fn new(profile: BotProfile, credentials: Credentials) -> Self {
        Self {
            profile,
            credentials,
            endpoints: Endpoints::default(),
            tools: ToolConfig::default(),
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Reads the credentials `profile` needs through `lookup` (normally `std::env::var`).
///
/// Fails only when the bot token is missing, or, for the stream bot, when the
/// Telegram API id is missing or not an integer. Spotify credentials are not
/// validated here; a bad pair surfaces as an auth failure on the first search.
pub fn load_credentials<F>(profile: BotProfile, lookup: F) -> Result<Credentials, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let bot_token = non_empty(lookup(profile.token_env_var())).ok_or_else(|| {
        Error::Config(format!(
            "❌ Telegram Bot Token is missing. Please set {} (or add it to your .env file).",
            profile.token_env_var()
        ))
    })?;

    let spotify_client_id = non_empty(lookup(SPOTIFY_CLIENT_ID_VAR)).unwrap_or_default();
    let spotify_client_secret = non_empty(lookup(SPOTIFY_CLIENT_SECRET_VAR)).unwrap_or_default();

    let (telegram_api_id, telegram_api_hash) = match profile {
        BotProfile::Listen2Play => (None, None),
        BotProfile::Melody4Stream => {
            let raw = non_empty(lookup(TELEGRAM_API_ID_VAR)).ok_or_else(|| {
                Error::Config(format!("{TELEGRAM_API_ID_VAR} is missing"))
            })?;
            let id = raw.parse::<i32>().map_err(|e| {
                Error::Config(format!("{TELEGRAM_API_ID_VAR} must be an integer: {e}"))
            })?;
            (Some(id), non_empty(lookup(TELEGRAM_API_HASH_VAR)))
        }
    };

    let credentials = Credentials {
        spotify_client_id,
        spotify_client_secret,
        bot_token,
        telegram_api_id,
        telegram_api_hash,
    };
    if !credentials.has_spotify() {
        warn!("Spotify client credentials are not set; searches will fail to authenticate.");
    }
    Ok(credentials)
}

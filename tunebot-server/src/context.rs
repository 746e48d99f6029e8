//! tunebot-server/src/context.rs
//!
//! Builds every service a bot process needs, once, and wires them together.

use std::sync::Arc;

use tracing::{info, warn};

use tunebot_common::models::BotProfile;
use tunebot_common::traits::{AudioLocator, TokenProvider, TrackResolver, VoiceTransport};
use tunebot_core::audio::YtDlpAudioLocator;
use tunebot_core::config::BotConfig;
use tunebot_core::http::{build_client, DEFAULT_REQUEST_TIMEOUT};
use tunebot_core::platforms::telegram::{TelegramBotClient, TelegramPlatform};
use tunebot_core::platforms::{BotRuntime, PlatformIntegration};
use tunebot_core::services::CommandDispatcher;
use tunebot_core::spotify::{CachedTokenProvider, SpotifyTokenProvider, SpotifyTrackResolver};
use tunebot_core::voice::{BridgeVoiceTransport, VoiceSessionManager};
use tunebot_core::Error;

/// The per-process context (a bag of references to the connected platform
/// and the services behind the dispatcher).
pub struct BotContext {
    pub profile: BotProfile,
    pub platform: Arc<TelegramPlatform>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub voice: Option<Arc<VoiceSessionManager>>,
}

impl BotContext {
    pub async fn new(config: BotConfig) -> Result<Self, Error> {
        let profile = config.profile;
        info!("Building {} with {:?}", profile.display_name(), config.credentials);

        // 1) Spotify: raw token exchange behind the single-flight cache.
        let spotify_http = build_client(DEFAULT_REQUEST_TIMEOUT)?;
        let raw_tokens: Arc<dyn TokenProvider> = Arc::new(SpotifyTokenProvider::new(
            spotify_http.clone(),
            &config.endpoints.spotify_accounts_url,
            &config.credentials,
        ));
        let tokens: Arc<dyn TokenProvider> = Arc::new(CachedTokenProvider::new(raw_tokens));
        let resolver: Arc<dyn TrackResolver> = Arc::new(SpotifyTrackResolver::new(
            spotify_http,
            &config.endpoints.spotify_api_url,
            tokens,
        ));

        // 2) Profile-specific services.
        let (dispatcher, voice) = match profile {
            BotProfile::Listen2Play => (CommandDispatcher::listen2play(resolver), None),
            BotProfile::Melody4Stream => {
                let locator: Arc<dyn AudioLocator> = Arc::new(YtDlpAudioLocator::new(
                    config.tools.ytdlp_program.clone(),
                    config.tools.lookup_timeout,
                ));
                let transport: Arc<dyn VoiceTransport> = Arc::new(BridgeVoiceTransport::new(
                    config.tools.voice_bridge_program.clone(),
                    config.credentials.telegram_api_id,
                    config.credentials.telegram_api_hash.clone(),
                    config.tools.join_timeout,
                ));
                let voice = Arc::new(VoiceSessionManager::new(transport));
                (
                    CommandDispatcher::melody4stream(resolver, locator, Arc::clone(&voice)),
                    Some(voice),
                )
            }
        };

        // 3) Chat platform. Connecting validates the bot token.
        let telegram_http = build_client(DEFAULT_REQUEST_TIMEOUT)?;
        let mut platform = TelegramPlatform::new(TelegramBotClient::new(
            telegram_http,
            &config.endpoints.telegram_api_url,
            &config.credentials.bot_token,
        ));
        platform.connect().await?;

        Ok(Self {
            profile,
            platform: Arc::new(platform),
            dispatcher: Arc::new(dispatcher),
            voice,
        })
    }

    /// Runs the bot until Ctrl-C or until the platform stops, then leaves
    /// any voice chats still playing.
    pub async fn run(self) {
        let runtime = BotRuntime::new(Arc::clone(&self.platform), Arc::clone(&self.dispatcher));

        tokio::select! {
            _ = runtime.run() => {
                warn!("[{}] event loop stopped on its own", self.profile);
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!("Failed to listen for Ctrl-C: {e}");
                }
                info!("[{}] Ctrl-C received, shutting down", self.profile);
            }
        }

        self.platform.shutdown();
        if let Some(voice) = &self.voice {
            voice.shutdown().await;
        }
    }
}

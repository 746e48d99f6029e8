use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use tunebot_common::models::BotProfile;
use tunebot_core::audio::ytdlp::DEFAULT_YTDLP_PROGRAM;
use tunebot_core::config::{BotConfig, Endpoints, ToolConfig, load_credentials};
use tunebot_core::platforms::telegram::client::DEFAULT_API_URL as DEFAULT_TELEGRAM_API_URL;
use tunebot_core::spotify::{DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL as DEFAULT_SPOTIFY_API_URL};
use tunebot_core::voice::bridge::DEFAULT_BRIDGE_PROGRAM;

mod context;
mod launcher;

use context::BotContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "tunebot")]
#[command(author, version, about = "Tunebot - Spotify search and voice-chat streaming bots for Telegram")]
pub struct Args {
    /// Mode: "listen2play", "melody4stream" or "launch" (both bots as child processes)
    #[arg(long, default_value = "launch")]
    mode: String,

    /// Spotify accounts service base URL (token exchange).
    #[arg(long, env = "SPOTIFY_ACCOUNTS_URL", default_value = DEFAULT_ACCOUNTS_URL)]
    spotify_accounts_url: String,

    /// Spotify Web API base URL (search).
    #[arg(long, env = "SPOTIFY_API_URL", default_value = DEFAULT_SPOTIFY_API_URL)]
    spotify_api_url: String,

    /// Telegram Bot API base URL.
    #[arg(long, env = "TELEGRAM_BOT_API_URL", default_value = DEFAULT_TELEGRAM_API_URL)]
    telegram_api_url: String,

    /// yt-dlp executable used to locate audio streams.
    #[arg(long, env = "YTDLP_PATH", default_value = DEFAULT_YTDLP_PROGRAM)]
    ytdlp_path: String,

    /// Voice-call bridge executable (melody4stream only).
    #[arg(long, env = "VOICE_BRIDGE_CMD", default_value = DEFAULT_BRIDGE_PROGRAM)]
    voice_bridge_cmd: String,

    /// Seconds to wait for an audio lookup.
    #[arg(long, env = "LOOKUP_TIMEOUT_SECS", default_value_t = 30)]
    lookup_timeout_secs: u64,

    /// Seconds to wait for the voice bridge to join a call.
    #[arg(long, env = "JOIN_TIMEOUT_SECS", default_value_t = 15)]
    join_timeout_secs: u64,
}

impl Args {
    /// Overrides handed to child bots by the launcher. Environment is used
    /// rather than flags so each child still honours its own `.env`.
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("SPOTIFY_ACCOUNTS_URL", self.spotify_accounts_url.clone()),
            ("SPOTIFY_API_URL", self.spotify_api_url.clone()),
            ("TELEGRAM_BOT_API_URL", self.telegram_api_url.clone()),
            ("YTDLP_PATH", self.ytdlp_path.clone()),
            ("VOICE_BRIDGE_CMD", self.voice_bridge_cmd.clone()),
            ("LOOKUP_TIMEOUT_SECS", self.lookup_timeout_secs.to_string()),
            ("JOIN_TIMEOUT_SECS", self.join_timeout_secs.to_string()),
        ]
    }

    fn bot_config(&self, profile: BotProfile) -> anyhow::Result<BotConfig> {
        let credentials = load_credentials(profile, |k| std::env::var(k).ok())?;
        let mut config = BotConfig::new(profile, credentials);
        config.endpoints = Endpoints {
            spotify_accounts_url: self.spotify_accounts_url.clone(),
            spotify_api_url: self.spotify_api_url.clone(),
            telegram_api_url: self.telegram_api_url.clone(),
        };
        config.tools = ToolConfig {
            ytdlp_program: self.ytdlp_path.clone(),
            lookup_timeout: Duration::from_secs(self.lookup_timeout_secs),
            voice_bridge_program: self.voice_bridge_cmd.clone(),
            join_timeout: Duration::from_secs(self.join_timeout_secs),
        };
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,tunebot=info,tunebot_core=info")
    });
    fmt().with_env_filter(filter).init();
}

async fn run_bot(profile: BotProfile, args: &Args) -> anyhow::Result<()> {
    let config = args.bot_config(profile)?;
    let ctx = BotContext::new(config).await?;
    ctx.run().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // `.env` first so clap's env fallbacks can see it.
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Tunebot starting. mode={}", args.mode);

    let result = match args.mode.as_str() {
        "launch" => launcher::run(&args).await,
        other => match other.parse::<BotProfile>() {
            Ok(profile) => run_bot(profile, &args).await,
            Err(_) => Err(anyhow::anyhow!(
                "Invalid mode '{other}'. Use --mode=listen2play, --mode=melody4stream or --mode=launch."
            )),
        },
    };

    match result {
        Ok(()) => {
            info!("Main finished. Goodbye!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

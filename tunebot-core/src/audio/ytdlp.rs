// File: tunebot-core/src/audio/ytdlp.rs

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info};

use tunebot_common::models::AudioSource;
use tunebot_common::traits::AudioLocator;

use crate::Error;

pub const DEFAULT_YTDLP_PROGRAM: &str = "yt-dlp";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Finds a directly playable audio URL by running `yt-dlp` in URL-only mode.
pub struct YtDlpAudioLocator {
    program: String,
    lookup_timeout: Duration,
}

impl YtDlpAudioLocator {
    pub fn new(program: impl Into<String>, lookup_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            lookup_timeout,
        }
    }

    fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--no-playlist", "--no-warnings", "-f", "bestaudio", "-g"])
            .arg(format!("ytsearch1:{query}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// First http(s) line of the extractor output, if any.
fn first_stream_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("http://") || line.starts_with("https://"))
        .map(str::to_string)
}

#[async_trait]
impl AudioLocator for YtDlpAudioLocator {
    async fn locate(&self, title: &str, artist: &str) -> Result<Option<AudioSource>, Error> {
        let query = format!("{title} by {artist}");
        debug!("Looking up audio for '{query}' via {}", self.program);

        let output = match timeout(self.lookup_timeout, self.command(&query).output()).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => {
                error!("Failed to fetch YouTube audio: could not run {}: {e}", self.program);
                return Err(Error::Lookup(format!("could not run {}: {e}", self.program)));
            }
            Err(_) => {
                error!("Failed to fetch YouTube audio: lookup for '{query}' timed out");
                return Err(Error::Lookup(format!(
                    "lookup timed out after {}s",
                    self.lookup_timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().last().unwrap_or("no output").trim().to_string();
            error!("Failed to fetch YouTube audio: {} exited with {}: {reason}", self.program, output.status);
            return Err(Error::Lookup(format!("{} exited with {}: {reason}", self.program, output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match first_stream_url(&stdout) {
            Some(stream_url) => {
                info!("Found audio source for '{query}'");
                Ok(Some(AudioSource { stream_url }))
            }
            None => {
                info!("No audio candidates for '{query}'");
                Ok(None)
            }
        }
    }
}

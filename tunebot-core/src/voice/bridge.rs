//! voice/bridge.rs
//!
//! Voice transport backed by an external call-bridge program.
//!
//! Joining a Telegram group call needs a user (MTProto) session plus a media
//! stack, neither of which the bot owns. The bridge is a separate executable
//! that does both; we start one per chat:
//!
//! ```text
//! <bridge> <chat_id> <stream_url>     (env: TELEGRAM_API_ID, TELEGRAM_API_HASH)
//! ```
//!
//! It must print `JOINED` on stdout once it is in the call, or `ERROR <reason>`
//! and exit if it cannot join. Killing the process leaves the call.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use tunebot_common::models::{AudioSource, ChatId};
use tunebot_common::traits::VoiceTransport;

use crate::Error;

pub const DEFAULT_BRIDGE_PROGRAM: &str = "tgcalls-bridge";
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(15);

const JOINED_MARKER: &str = "JOINED";
const ERROR_MARKER: &str = "ERROR";

type BridgeLines = Lines<BufReader<ChildStdout>>;
type CallRegistry = Arc<Mutex<HashMap<ChatId, BridgeCall>>>;

/// A running bridge process and the task that supervises it.
struct BridgeCall {
    /// Distinguishes this bridge from a later one for the same chat.
    generation: u64,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl BridgeCall {
    async fn shutdown(self) -> Result<(), Error> {
        // The supervisor may already be gone if the bridge exited by itself.
        let _ = self.stop.send(());
        self.task
            .await
            .map_err(|e| Error::Leave(format!("voice bridge supervisor failed: {e}")))
    }
}

pub struct BridgeVoiceTransport {
    program: String,
    api_id: Option<i32>,
    api_hash: Option<String>,
    join_timeout: Duration,
    calls: CallRegistry,
    next_generation: AtomicU64,
}

impl BridgeVoiceTransport {
    pub fn new(
        program: impl Into<String>,
        api_id: Option<i32>,
        api_hash: Option<String>,
        join_timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            api_id,
            api_hash,
            join_timeout,
            calls: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    fn command(&self, chat_id: ChatId, source: &AudioSource) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(chat_id.to_string())
            .arg(&source.stream_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(id) = self.api_id {
            cmd.env("TELEGRAM_API_ID", id.to_string());
        }
        if let Some(hash) = &self.api_hash {
            cmd.env("TELEGRAM_API_HASH", hash);
        }
        cmd
    }

    /// Number of bridge processes currently registered.
    pub async fn active_calls(&self) -> usize {
        self.calls.lock().await.len()
    }
}

/// Reads bridge output until it reports the outcome of the join.
async fn wait_for_join(lines: &mut BridgeLines) -> Result<(), Error> {
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| Error::Join(format!("reading voice bridge output: {e}")))?
    {
        let line = line.trim();
        if line == JOINED_MARKER {
            return Ok(());
        }
        if let Some(reason) = line.strip_prefix(ERROR_MARKER) {
            return Err(Error::Join(reason.trim().to_string()));
        }
        debug!("(voice bridge) {line}");
    }
    Err(Error::Join("voice bridge exited before joining".into()))
}

/// Owns the child after a successful join: drains its stdout, and kills it
/// when asked to stop. A bridge that ends by itself is reaped and its chat
/// dropped from the registry.
async fn supervise(
    chat_id: ChatId,
    generation: u64,
    calls: CallRegistry,
    mut child: Child,
    mut lines: BridgeLines,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stop => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill voice bridge for chat {chat_id}: {e}");
                }
                return;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => debug!("(voice bridge {chat_id}) {}", line.trim()),
                Ok(None) | Err(_) => break,
            }
        }
    }

    // Stdout closed: the bridge is on its way out.
    tokio::select! {
        _ = &mut stop => {
            let _ = child.kill().await;
        }
        status = child.wait() => {
            info!("Voice bridge for chat {chat_id} exited: {status:?}");
            let mut calls = calls.lock().await;
            if calls.get(&chat_id).is_some_and(|c| c.generation == generation) {
                calls.remove(&chat_id);
            }
        }
    }
}

#[async_trait]
impl VoiceTransport for BridgeVoiceTransport {
    async fn join(&self, chat_id: ChatId, source: &AudioSource) -> Result<(), Error> {
        let mut child = self.command(chat_id, source).spawn().map_err(|e| {
            Error::Join(format!("failed to start voice bridge '{}': {e}", self.program))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Join("voice bridge stdout not captured".into()))?;
        let mut lines = BufReader::new(stdout).lines();

        let outcome = match timeout(self.join_timeout, wait_for_join(&mut lines)).await {
            Ok(res) => res,
            Err(_) => Err(Error::Join(format!(
                "voice bridge did not join within {}ms",
                self.join_timeout.as_millis()
            ))),
        };
        if let Err(e) = outcome {
            let _ = child.kill().await;
            return Err(e);
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (stop_tx, stop_rx) = oneshot::channel();
        // Lock held until the entry is in; the supervisor may remove it at once.
        let mut calls = self.calls.lock().await;
        let task = tokio::spawn(supervise(
            chat_id,
            generation,
            Arc::clone(&self.calls),
            child,
            lines,
            stop_rx,
        ));
        let previous = calls.insert(
            chat_id,
            BridgeCall {
                generation,
                stop: stop_tx,
                task,
            },
        );
        drop(calls);
        if let Some(stale) = previous {
            warn!("Replacing stale voice bridge for chat {chat_id}");
            let _ = stale.shutdown().await;
        }

        info!("Joined voice chat {chat_id}");
        Ok(())
    }

    async fn leave(&self, chat_id: ChatId) -> Result<(), Error> {
        let call = self
            .calls
            .lock()
            .await
            .remove(&chat_id)
            .ok_or_else(|| Error::Leave(format!("not in a voice chat in chat {chat_id}")))?;
        call.shutdown().await?;
        info!("Left voice chat {chat_id}");
        Ok(())
    }

    async fn is_active(&self, chat_id: ChatId) -> bool {
        self.calls.lock().await.contains_key(&chat_id)
    }
}

//! Starts both bots as child processes of this executable and waits for them.

use std::process::ExitStatus;

use anyhow::{bail, Context};
use futures_util::future::join_all;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use tunebot_common::models::BotProfile;

use crate::Args;

const BOTS: [BotProfile; 2] = [BotProfile::Listen2Play, BotProfile::Melody4Stream];

async fn wait_for(profile: BotProfile, mut child: Child) -> (BotProfile, std::io::Result<ExitStatus>) {
    (profile, child.wait().await)
}

pub async fn run(args: &Args) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("locating the tunebot executable")?;

    let mut children = Vec::with_capacity(BOTS.len());
    for profile in BOTS {
        let child = Command::new(&exe)
            .arg("--mode")
            .arg(profile.to_string())
            .envs(args.child_env())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("starting {}", profile.display_name()))?;
        info!("Started {} (pid {:?})", profile.display_name(), child.id());
        children.push(wait_for(profile, child));
    }

    let mut failed = Vec::new();
    for (profile, status) in join_all(children).await {
        match status {
            Ok(s) if s.success() => info!("{} exited cleanly", profile.display_name()),
            Ok(s) => {
                warn!("{} exited with {s}", profile.display_name());
                failed.push(profile);
            }
            Err(e) => {
                error!("Failed to wait on {}: {e}", profile.display_name());
                failed.push(profile);
            }
        }
    }

    if !failed.is_empty() {
        bail!("bot(s) failed: {failed:?}");
    }
    Ok(())
}

// File: tunebot-core/tests/process_tests.rs
//
// yt-dlp and the voice bridge are driven through stand-in shell scripts.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use tunebot_common::models::{AudioSource, VoiceState};
use tunebot_common::traits::{AudioLocator, VoiceTransport};
use tunebot_core::audio::YtDlpAudioLocator;
use tunebot_core::voice::{BridgeVoiceTransport, VoiceSessionManager};
use tunebot_core::Error;

fn script(dir: &TempDir, name: &str, body: &str) -> String {
    let path: PathBuf = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn source() -> AudioSource {
    AudioSource {
        stream_url: "https://rr1.example/audio".into(),
    }
}

// ---------------------------------------------------------------------------
// yt-dlp
// ---------------------------------------------------------------------------

#[tokio::test]
async fn locator_returns_first_stream_url() {
    let dir = TempDir::new().unwrap();
    let program = script(
        &dir,
        "yt-dlp",
        r#"[ "$6" = "ytsearch1:Believer by Imagine Dragons" ] || exit 2
echo "[youtube] Extracting"
echo "https://rr1.example/audio?id=1"
echo "https://rr2.example/audio?id=2""#,
    );

    let locator = YtDlpAudioLocator::new(program, Duration::from_secs(10));
    let found = locator.locate("Believer", "Imagine Dragons").await.unwrap();
    assert_eq!(
        found,
        Some(AudioSource {
            stream_url: "https://rr1.example/audio?id=1".into()
        })
    );
}

#[tokio::test]
async fn locator_without_candidates_is_none() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "yt-dlp", "exit 0");

    let locator = YtDlpAudioLocator::new(program, Duration::from_secs(10));
    assert_eq!(locator.locate("nothing", "nobody").await.unwrap(), None);
}

#[tokio::test]
async fn locator_failures_are_lookup_errors() {
    let dir = TempDir::new().unwrap();
    let failing = script(&dir, "yt-dlp-fail", "echo 'ERROR: unable to extract' >&2\nexit 1");
    let slow = script(&dir, "yt-dlp-slow", "exec sleep 30");

    let err = YtDlpAudioLocator::new(failing, Duration::from_secs(10))
        .locate("a", "b")
        .await
        .unwrap_err();
    match err {
        Error::Lookup(msg) => assert!(msg.contains("unable to extract"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = YtDlpAudioLocator::new(slow, Duration::from_millis(200))
        .locate("a", "b")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Lookup(_)));

    let err = YtDlpAudioLocator::new("/nonexistent/yt-dlp", Duration::from_secs(1))
        .locate("a", "b")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Lookup(_)));
}

// ---------------------------------------------------------------------------
// Voice bridge
// ---------------------------------------------------------------------------

fn bridge(program: String, timeout: Duration) -> BridgeVoiceTransport {
    BridgeVoiceTransport::new(program, Some(12345), Some("hash".into()), timeout)
}

#[tokio::test]
async fn bridge_join_and_leave() {
    let dir = TempDir::new().unwrap();
    let program = script(
        &dir,
        "bridge",
        r#"[ "$TELEGRAM_API_ID" = "12345" ] || { echo "ERROR missing api id"; exit 1; }
[ "$2" = "https://rr1.example/audio" ] || { echo "ERROR wrong url"; exit 1; }
echo "connecting to $1"
echo JOINED
exec sleep 30"#,
    );

    let transport = bridge(program, Duration::from_secs(5));
    transport.join(-100, &source()).await.unwrap();
    assert_eq!(transport.active_calls().await, 1);

    transport.leave(-100).await.unwrap();
    assert_eq!(transport.active_calls().await, 0);
}

#[tokio::test]
async fn bridge_error_line_fails_join() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "bridge", "echo 'ERROR no active group call'\nexit 1");

    let err = bridge(program, Duration::from_secs(5))
        .join(1, &source())
        .await
        .unwrap_err();
    match err {
        Error::Join(reason) => assert_eq!(reason, "no active group call"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bridge_that_never_joins_times_out() {
    let dir = TempDir::new().unwrap();
    let silent_exit = script(&dir, "bridge-exit", "exit 0");
    let hang = script(&dir, "bridge-hang", "exec sleep 30");

    let transport = bridge(silent_exit, Duration::from_secs(5));
    assert!(matches!(transport.join(1, &source()).await, Err(Error::Join(_))));

    let transport = bridge(hang, Duration::from_millis(200));
    assert!(matches!(transport.join(1, &source()).await, Err(Error::Join(_))));
    assert_eq!(transport.active_calls().await, 0);
}

#[tokio::test]
async fn bridge_that_ends_by_itself_frees_the_chat() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "bridge", "echo JOINED\nsleep 0.2\nexit 0");

    let transport = bridge(program, Duration::from_secs(5));
    transport.join(4, &source()).await.unwrap();

    let mut freed = false;
    for _ in 0..50 {
        if transport.active_calls().await == 0 {
            freed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(freed, "bridge entry was not removed after exit");
    assert!(matches!(transport.leave(4).await, Err(Error::Leave(_))));
}

#[tokio::test]
async fn bridge_leave_without_call_is_an_error() {
    let transport = bridge("/nonexistent/bridge".into(), Duration::from_secs(1));
    assert!(matches!(transport.leave(3).await, Err(Error::Leave(_))));
    assert!(matches!(transport.join(3, &source()).await, Err(Error::Join(_))));
}

#[tokio::test]
async fn session_manager_drives_the_bridge() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "bridge", "echo JOINED\nexec sleep 30");

    let transport = Arc::new(bridge(program, Duration::from_secs(5)));
    let voice = VoiceSessionManager::new(transport.clone());

    voice.start(42, &source()).await.unwrap();
    assert_eq!(voice.state(42), VoiceState::Playing);
    assert_eq!(transport.active_calls().await, 1);

    voice.shutdown().await;
    assert_eq!(voice.state(42), VoiceState::Idle);
    assert_eq!(transport.active_calls().await, 0);
}

#[tokio::test]
async fn chat_is_playable_again_after_the_bridge_ends() {
    let dir = TempDir::new().unwrap();
    let short = script(&dir, "bridge", "echo JOINED\nsleep 0.2\nexit 0");

    let transport = Arc::new(bridge(short, Duration::from_secs(5)));
    let voice = VoiceSessionManager::new(transport.clone());

    voice.start(9, &source()).await.unwrap();
    assert!(transport.is_active(9).await);

    let mut ended = false;
    for _ in 0..50 {
        if !transport.is_active(9).await {
            ended = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(ended, "bridge call still registered after exit");
    assert_eq!(voice.state(9), VoiceState::Playing);

    voice.start(9, &source()).await.unwrap();
    assert_eq!(voice.state(9), VoiceState::Playing);
}

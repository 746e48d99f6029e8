// File: tunebot-core/tests/voice_session_tests.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};

use tunebot_common::models::{AudioSource, ChatId, VoiceState};
use tunebot_common::traits::{MockVoiceTransport, VoiceTransport};
use tunebot_core::voice::VoiceSessionManager;
use tunebot_core::Error;

fn source() -> AudioSource {
    AudioSource {
        stream_url: "https://media.example/stream.webm".into(),
    }
}

#[tokio::test]
async fn start_then_stop_returns_to_idle() {
    let mut transport = MockVoiceTransport::new();
    transport
        .expect_join()
        .withf(|chat, src| *chat == 42 && src.stream_url.ends_with("stream.webm"))
        .times(1)
        .returning(|_, _| Ok(()));
    transport.expect_leave().times(1).returning(|_| Ok(()));

    let voice = VoiceSessionManager::new(Arc::new(transport));
    assert_eq!(voice.state(42), VoiceState::Idle);

    assert_ok!(voice.start(42, &source()).await);
    assert_eq!(voice.state(42), VoiceState::Playing);
    assert_eq!(voice.active_chats(), vec![42]);

    assert_ok!(voice.stop(42).await);
    assert_eq!(voice.state(42), VoiceState::Idle);
    assert!(voice.active_chats().is_empty());
}

#[tokio::test]
async fn stop_when_idle_is_a_leave_error() {
    let mut transport = MockVoiceTransport::new();
    transport.expect_leave().times(0);

    let voice = VoiceSessionManager::new(Arc::new(transport));
    let err = voice.stop(7).await.unwrap_err();
    assert!(matches!(err, Error::Leave(_)));
    assert_eq!(voice.state(7), VoiceState::Idle);
}

#[tokio::test]
async fn second_start_while_playing_is_rejected() {
    let mut transport = MockVoiceTransport::new();
    transport.expect_join().times(1).returning(|_, _| Ok(()));
    transport
        .expect_is_active()
        .withf(|chat| *chat == 1)
        .times(1)
        .returning(|_| true);

    let voice = VoiceSessionManager::new(Arc::new(transport));
    assert_ok!(voice.start(1, &source()).await);

    let err = voice.start(1, &source()).await.unwrap_err();
    assert!(matches!(err, Error::Join(_)));
    assert_eq!(voice.state(1), VoiceState::Playing);
}

#[tokio::test]
async fn stream_that_ended_by_itself_can_be_restarted() {
    let mut transport = MockVoiceTransport::new();
    transport.expect_join().times(2).returning(|_, _| Ok(()));
    transport.expect_is_active().times(1).returning(|_| false);
    transport.expect_leave().times(0);

    let voice = VoiceSessionManager::new(Arc::new(transport));
    assert_ok!(voice.start(6, &source()).await);
    assert_ok!(voice.start(6, &source()).await);
    assert_eq!(voice.state(6), VoiceState::Playing);
    assert_eq!(voice.active_chats(), vec![6]);
}

#[tokio::test]
async fn failed_join_resets_to_idle() {
    let mut transport = MockVoiceTransport::new();
    transport
        .expect_join()
        .times(1)
        .returning(|_, _| Err(Error::Join("no active voice chat".into())));

    let voice = VoiceSessionManager::new(Arc::new(transport));
    let err = voice.start(9, &source()).await.unwrap_err();
    assert!(matches!(err, Error::Join(_)));
    assert_eq!(voice.state(9), VoiceState::Idle);
}

#[tokio::test]
async fn non_join_transport_errors_surface_as_join_errors() {
    let mut transport = MockVoiceTransport::new();
    transport
        .expect_join()
        .returning(|_, _| Err(Error::Platform("boom".into())));

    let voice = VoiceSessionManager::new(Arc::new(transport));
    assert!(matches!(voice.start(3, &source()).await, Err(Error::Join(_))));
}

#[tokio::test]
async fn failed_leave_still_ends_idle() {
    let mut transport = MockVoiceTransport::new();
    transport.expect_join().returning(|_, _| Ok(()));
    transport
        .expect_leave()
        .times(1)
        .returning(|_| Err(Error::Leave("bridge gone".into())));

    let voice = VoiceSessionManager::new(Arc::new(transport));
    assert_ok!(voice.start(5, &source()).await);
    assert_err!(voice.stop(5).await);
    assert_eq!(voice.state(5), VoiceState::Idle);
}

#[tokio::test]
async fn chats_are_independent() {
    let mut transport = MockVoiceTransport::new();
    transport.expect_join().times(2).returning(|_, _| Ok(()));
    transport.expect_leave().times(1).returning(|_| Ok(()));

    let voice = VoiceSessionManager::new(Arc::new(transport));
    assert_ok!(voice.start(1, &source()).await);
    assert_ok!(voice.start(2, &source()).await);
    assert_ok!(voice.stop(1).await);
    assert_eq!(voice.state(1), VoiceState::Idle);
    assert_eq!(voice.state(2), VoiceState::Playing);
}

#[tokio::test]
async fn shutdown_leaves_every_playing_chat() {
    let mut transport = MockVoiceTransport::new();
    transport.expect_join().times(3).returning(|_, _| Ok(()));
    transport.expect_leave().times(3).returning(|_| Ok(()));

    let voice = VoiceSessionManager::new(Arc::new(transport));
    for chat in [10, 20, 30] {
        assert_ok!(voice.start(chat, &source()).await);
    }
    voice.shutdown().await;
    assert!(voice.active_chats().is_empty());
}

/// Transport whose join takes a while, so a second start can race the first.
struct SlowJoin;

#[async_trait]
impl VoiceTransport for SlowJoin {
    async fn join(&self, _chat_id: ChatId, _source: &AudioSource) -> Result<(), Error> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }

    async fn leave(&self, _chat_id: ChatId) -> Result<(), Error> {
        Ok(())
    }

    async fn is_active(&self, _chat_id: ChatId) -> bool {
        true
    }
}

#[tokio::test]
async fn concurrent_starts_only_one_wins() {
    let voice = Arc::new(VoiceSessionManager::new(Arc::new(SlowJoin)));

    let a = {
        let voice = Arc::clone(&voice);
        tokio::spawn(async move { voice.start(77, &source()).await })
    };
    let b = {
        let voice = Arc::clone(&voice);
        tokio::spawn(async move { voice.start(77, &source()).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(Error::Join(_)))));
    assert_eq!(voice.state(77), VoiceState::Playing);
}

#[tokio::test]
async fn stop_while_joining_is_rejected() {
    let voice = Arc::new(VoiceSessionManager::new(Arc::new(SlowJoin)));

    let joining = {
        let voice = Arc::clone(&voice);
        tokio::spawn(async move { voice.start(8, &source()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(voice.state(8), VoiceState::Joining);
    assert!(matches!(voice.stop(8).await, Err(Error::Leave(_))));

    assert_ok!(joining.await.unwrap());
    assert_eq!(voice.state(8), VoiceState::Playing);
}

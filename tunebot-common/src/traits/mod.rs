pub mod music_traits;
pub mod platform_traits;

pub use music_traits::{AudioLocator, TokenProvider, TrackResolver, VoiceTransport};
#[cfg(feature = "mocks")]
pub use music_traits::{MockAudioLocator, MockTokenProvider, MockTrackResolver, MockVoiceTransport};
pub use platform_traits::{ChatPlatform, ConnectionStatus, PlatformAuth, PlatformIntegration};

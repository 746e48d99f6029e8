pub mod bridge;
pub mod session;

pub use bridge::BridgeVoiceTransport;
pub use session::VoiceSessionManager;

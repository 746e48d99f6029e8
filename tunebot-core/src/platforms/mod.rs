// File: src/platforms/mod.rs

pub use tunebot_common::traits::platform_traits::{
    ChatPlatform, ConnectionStatus, PlatformAuth, PlatformIntegration,
};

pub mod manager;
pub mod telegram;

pub use manager::BotRuntime;

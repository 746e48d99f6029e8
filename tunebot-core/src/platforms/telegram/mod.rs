pub mod client;
pub mod runtime;

pub use client::TelegramBotClient;
pub use runtime::TelegramPlatform;

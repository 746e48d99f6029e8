// File: src/services/mod.rs

pub mod command_service;
pub mod replies;

pub use command_service::{CommandDispatcher, PlaybackServices};

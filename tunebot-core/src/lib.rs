// src/lib.rs

pub mod audio;
pub mod config;
pub mod http;
pub mod platforms;
pub mod services;
pub mod spotify;
pub mod voice;

pub use tunebot_common::error::Error;

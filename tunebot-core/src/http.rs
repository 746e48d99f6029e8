//! Shared HTTP plumbing for the outbound service clients.
//!
//! Every client (Spotify accounts, Spotify Web API, Telegram Bot API) gets a
//! `reqwest::Client` built here so timeouts and the user agent are applied in
//! one place. Base URLs are always injected, which is what lets the test
//! suites point the clients at a local mock server.

use std::time::Duration;

use crate::Error;

/// Default timeout for request/response style calls (token exchange, search, sendMessage).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("tunebot/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Joins `path` onto a configured base URL, tolerating a trailing slash on the base.
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

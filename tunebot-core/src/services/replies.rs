//! Fixed user-facing reply texts.

use tunebot_common::models::TrackMatch;

pub const SONG_USAGE: &str = "❌ Please provide a song name! Example: /song Believer";
pub const PLAY_USAGE: &str = "❌ Please provide a song name! Example: /play Believer";
pub const NO_SONG_FOUND: &str = "❌ No song found!";
pub const AUTH_FAILED: &str = "❌ Failed to authenticate with Spotify.";
pub const SEARCH_FAILED: &str = "❌ Failed to search for the song. Please try again later.";
pub const NO_AUDIO_SOURCE: &str = "❌ Couldn't find an audio source for this song.";
pub const JOIN_FAILED: &str = "❌ Failed to join voice chat. Please try again.";
pub const STOPPED: &str = "🛑 Stopped playing music!";
pub const STOP_FAILED: &str = "❌ Failed to stop playback. Please try again.";

pub fn song_found(track: &TrackMatch) -> String {
    format!("🎵 {} by {}\n🔗 {}", track.title, track.artist, track.external_link)
}

/// `MarkdownV2` reply for a stream that started playing.
pub fn now_playing(track: &TrackMatch) -> String {
    format!(
        "🎵 Playing *{}* by *{}*\n🔗 [Listen on Spotify]({})",
        escape_markdown(&track.title),
        escape_markdown(&track.artist),
        escape_link_url(&track.external_link)
    )
}

/// Escapes every character `MarkdownV2` reserves in ordinary text.
pub fn escape_markdown(text: &str) -> String {
    escape_with(text, |c| {
        matches!(
            c,
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
                | '|' | '{' | '}' | '.' | '!' | '\\'
        )
    })
}

/// Inside the `(...)` part of an inline link only `)` and `\` are reserved.
pub fn escape_link_url(url: &str) -> String {
    escape_with(url, |c| matches!(c, ')' | '\\'))
}

fn escape_with(text: &str, reserved: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if reserved(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

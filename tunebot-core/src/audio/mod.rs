pub mod ytdlp;

pub use ytdlp::YtDlpAudioLocator;

pub mod config;
pub mod error;
pub mod pipeline;
pub mod summarize;
pub mod vtt;
pub mod youtube;

pub use error::{Error, Result};

/// Title and subtitle track listing of a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    /// Language codes of human-authored tracks
    pub subtitles: Vec<String>,
    /// Language codes of speech-to-text tracks
    pub automatic_captions: Vec<String>,
}

/// Whether a subtitle track was written by a person or generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Manual,
    Automatic,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Manual => write!(f, "manual"),
            TrackKind::Automatic => write!(f, "automatic"),
        }
    }
}

/// The subtitle track picked for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackChoice {
    pub lang: String,
    pub kind: TrackKind,
}

/// Raw VTT text of a downloaded track
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    pub text: String,
    pub lang: String,
    pub kind: TrackKind,
}

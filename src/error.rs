use thiserror::Error;

/// Failures of a single summarization run. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL could not be resolved or the service was unreachable
    #[error("error fetching video info: {0}")]
    Metadata(String),

    #[error("no {lang} subtitles found for this video")]
    SubtitleUnavailable { lang: String },

    #[error("error downloading subtitles: {0}")]
    SubtitleDownload(String),

    #[error("transcript too short ({chars} characters), the video may not have usable captions")]
    TranscriptTooShort { chars: usize },

    /// The summarization backend is missing, failed, or returned nothing
    #[error("error calling summarizer: {0}")]
    Summarizer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_unavailable_message_names_language() {
        let err = Error::SubtitleUnavailable { lang: "en".to_string() };
        assert_eq!(err.to_string(), "no en subtitles found for this video");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

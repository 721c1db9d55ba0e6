use std::io::Write;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::summarize::{self, MAX_TRANSCRIPT_CHARS, Summarizer};
use crate::youtube::{self, VideoSource};
use crate::{TrackKind, vtt};

/// Transcripts shorter than this are treated as missing captions
pub const MIN_TRANSCRIPT_CHARS: usize = 50;

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct Outcome {
    pub title: String,
    pub summary: String,
    pub subtitle_lang: String,
    pub subtitle_kind: TrackKind,
    /// Length of the cleaned transcript before truncation
    pub transcript_chars: usize,
    pub truncated: bool,
}

/// Fetch info, download subtitles, clean them, summarize.
pub struct Pipeline<'a> {
    source: &'a dyn VideoSource,
    summarizer: &'a dyn Summarizer,
    lang: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn VideoSource, summarizer: &'a dyn Summarizer) -> Self {
        Self {
            source,
            summarizer,
            lang: "en".to_string(),
        }
    }

    /// Subtitle language to look for (default `en`)
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Run every stage in order, writing status lines to `progress`.
    ///
    /// The first failing stage ends the run; nothing is summarized after an error.
    pub async fn run<W: Write>(&self, url: &str, progress: &mut W) -> Result<Outcome> {
        writeln!(progress, "Fetching video info...")?;
        let info = self.source.fetch_info(url).await?;
        info!("Video {} ({}): {}", info.id, url, info.title);
        writeln!(progress, "Title: {}", info.title)?;

        writeln!(progress, "Downloading subtitles...")?;
        let doc = youtube::extract_subtitles(self.source, url, &info, &self.lang).await?;
        debug!("Downloaded {} {} subtitles, {} bytes", doc.kind, doc.lang, doc.text.len());

        writeln!(progress, "Cleaning transcript...")?;
        let transcript = vtt::clean(&doc.text);
        let transcript_chars = transcript.chars().count();
        debug!("Cleaned transcript: {transcript_chars} characters, {} lines", transcript.lines().count());
        if transcript_chars < MIN_TRANSCRIPT_CHARS {
            return Err(Error::TranscriptTooShort { chars: transcript_chars });
        }

        let (kept, truncated) = summarize::truncate(&transcript, MAX_TRANSCRIPT_CHARS);
        if truncated {
            writeln!(progress, "Transcript truncated to {MAX_TRANSCRIPT_CHARS} characters.")?;
        }

        writeln!(
            progress,
            "Summarizing with {} ({})...",
            self.summarizer.name(),
            self.summarizer.model()
        )?;
        let prompt = summarize::build_prompt(&info.title, kept, truncated);
        let summary = self.summarizer.complete(&prompt).await?;
        info!("Summary: {} characters", summary.len());

        Ok(Outcome {
            title: info.title,
            summary,
            subtitle_lang: doc.lang,
            subtitle_kind: doc.kind,
            transcript_chars,
            truncated,
        })
    }
}

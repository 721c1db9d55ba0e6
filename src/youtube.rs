use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::{SubtitleDocument, TrackChoice, TrackKind, VideoInfo};

const UNKNOWN_TITLE: &str = "Unknown Title";

/// Where video metadata and subtitle files come from
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch the title and the subtitle track listing for a video
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo>;

    /// Download one subtitle track as VTT into `dir`
    async fn download_subtitles(&self, url: &str, track: &TrackChoice, dir: &Path) -> Result<()>;
}

/// `yt-dlp` driven as a subprocess
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[derive(Debug, Deserialize)]
struct InfoJson {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitles: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    automatic_captions: Option<BTreeMap<String, serde_json::Value>>,
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        debug!("Fetching video info via {}: {url}", self.program);

        let output = Command::new(&self.program)
            .args(["--dump-single-json", "--skip-download", "--no-playlist", "--no-warnings", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Metadata(launch_failure(&self.program, &e)))?;

        if !output.status.success() {
            return Err(Error::Metadata(failure_message(&output)));
        }

        parse_info(&output.stdout)
    }

    async fn download_subtitles(&self, url: &str, track: &TrackChoice, dir: &Path) -> Result<()> {
        let template = dir.join("subs.%(ext)s");
        let write_flag = match track.kind {
            TrackKind::Manual => "--write-subs",
            TrackKind::Automatic => "--write-auto-subs",
        };
        debug!("Downloading {} subtitles ({}) into {}", track.kind, track.lang, dir.display());

        let output = Command::new(&self.program)
            .args(["--skip-download", write_flag, "--sub-langs", &track.lang])
            .args(["--sub-format", "vtt", "--no-playlist", "--no-warnings", "-o"])
            .arg(&template)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::SubtitleDownload(launch_failure(&self.program, &e)))?;

        if !output.status.success() {
            return Err(Error::SubtitleDownload(failure_message(&output)));
        }
        Ok(())
    }
}

fn launch_failure(program: &str, e: &std::io::Error) -> String {
    if e.kind() == std::io::ErrorKind::NotFound {
        format!("{program} not found (install it from https://github.com/yt-dlp/yt-dlp)")
    } else {
        format!("failed to run {program}: {e}")
    }
}

/// Last words of a failed yt-dlp run, usually its `ERROR:` line
fn failure_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.trim() {
        "" => format!("yt-dlp exited with {}", output.status),
        message => message.to_string(),
    }
}

pub(crate) fn parse_info(json: &[u8]) -> Result<VideoInfo> {
    let raw: InfoJson =
        serde_json::from_slice(json).map_err(|e| Error::Metadata(format!("unexpected yt-dlp output: {e}")))?;

    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    Ok(VideoInfo {
        id: raw.id.unwrap_or_default(),
        title,
        subtitles: track_languages(raw.subtitles),
        automatic_captions: track_languages(raw.automatic_captions),
    })
}

/// Language codes that actually list at least one format
fn track_languages(tracks: Option<BTreeMap<String, serde_json::Value>>) -> Vec<String> {
    tracks
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, formats)| formats.as_array().is_some_and(|f| !f.is_empty()))
        .map(|(lang, _)| lang)
        .collect()
}

/// Pick the subtitle track to download: a manual track in `lang` if there is one,
/// otherwise an automatic one.
///
/// Within a kind the exact code wins, then (automatic only) `<lang>-orig`, then the first
/// regional variant such as `en-GB`.
pub fn select_track(info: &VideoInfo, lang: &str) -> Option<TrackChoice> {
    pick_language(&info.subtitles, lang, false)
        .map(|lang| TrackChoice {
            lang,
            kind: TrackKind::Manual,
        })
        .or_else(|| {
            pick_language(&info.automatic_captions, lang, true).map(|lang| TrackChoice {
                lang,
                kind: TrackKind::Automatic,
            })
        })
}

fn pick_language(codes: &[String], lang: &str, allow_orig: bool) -> Option<String> {
    if codes.iter().any(|c| c == lang) {
        return Some(lang.to_string());
    }

    let orig = format!("{lang}-orig");
    if allow_orig && codes.iter().any(|c| *c == orig) {
        return Some(orig);
    }

    let prefix = format!("{lang}-");
    let mut variants: Vec<&String> = codes.iter().filter(|c| c.starts_with(&prefix) && **c != orig).collect();
    variants.sort();
    variants.first().map(|c| c.to_string())
}

/// Download the best `lang` track into a private temp directory and return its text.
///
/// The directory is removed when this future completes or is dropped.
pub async fn extract_subtitles<S>(source: &S, url: &str, info: &VideoInfo, lang: &str) -> Result<SubtitleDocument>
where
    S: VideoSource + ?Sized,
{
    let track = select_track(info, lang).ok_or_else(|| Error::SubtitleUnavailable { lang: lang.to_string() })?;
    debug!("Selected {} track: {}", track.kind, track.lang);

    let dir = tempfile::Builder::new().prefix("yts-").tempdir()?;
    source.download_subtitles(url, &track, dir.path()).await?;

    let path = find_vtt(dir.path())?.ok_or_else(|| Error::SubtitleUnavailable { lang: lang.to_string() })?;
    debug!("Reading subtitles from {}", path.display());
    let bytes = tokio::fs::read(&path).await?;

    Ok(SubtitleDocument {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        lang: track.lang,
        kind: track.kind,
    })
}

fn find_vtt(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("vtt"))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Default model handed to the summarization backend
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Default model for the OpenAI backend
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Longest transcript, in characters, that is sent to the backend
pub const MAX_TRANSCRIPT_CHARS: usize = 100_000;

/// A summarization backend: prompt text in, summary text out.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short backend name used in status lines
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Cut `transcript` to its first `max_chars` characters.
///
/// Returns the kept prefix and whether anything was dropped. The cut is by character
/// count and may land mid-word.
pub fn truncate(transcript: &str, max_chars: usize) -> (&str, bool) {
    match transcript.char_indices().nth(max_chars) {
        Some((idx, _)) => (&transcript[..idx], true),
        None => (transcript, false),
    }
}

pub fn build_prompt(title: &str, transcript: &str, truncated: bool) -> String {
    let note = if truncated {
        format!(
            "\nNote: the transcript was cut to its first {MAX_TRANSCRIPT_CHARS} characters, so the end of the video is missing.\n"
        )
    } else {
        String::new()
    };

    format!(
        r#"You are summarizing a YouTube video.

Video title: "{title}"

Below are the video's subtitles/transcript. Based on these subtitles:

1. First, write a short paragraph that directly answers or addresses the video's title. Many YouTube titles are clickbait, so cut through it and give the real answer upfront.

2. Then, list the key points and takeaways from the video as bullet points.

Be concise and factual. Only include information actually present in the subtitles.
{note}
--- SUBTITLES ---
{transcript}
--- END SUBTITLES ---"#
    )
}

/// Runs a command-line agent as `<program> -p --model <model>` with the prompt on stdin
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: String,
    model: String,
}

impl ClaudeCli {
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for ClaudeCli {
    fn name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Running {} with model {} ({} prompt bytes)", self.program, self.model, prompt.len());

        let mut child = Command::new(&self.program)
            .args(["-p", "--model", &self.model])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::Summarizer(format!("{} not found on PATH", self.program))
                } else {
                    Error::Summarizer(format!("failed to run {}: {e}", self.program))
                }
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Summarizer(format!("no stdin handle for {}", self.program)))?;

        let feed = async move {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await?;
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| Error::Summarizer(format!("failed waiting for {}: {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Summarizer(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if let Err(e) = fed {
            // An agent may legitimately stop reading once it has what it needs
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(Error::Summarizer(format!("failed writing prompt to {}: {e}", self.program)));
            }
        }

        let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if summary.is_empty() {
            return Err(Error::Summarizer(format!("{} returned an empty summary", self.program)));
        }
        Ok(summary)
    }
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes YouTube videos from their subtitles.";

/// Anthropic Messages API, authenticated with `ANTHROPIC_API_KEY`
#[derive(Debug, Clone)]
pub struct AnthropicApi {
    client: reqwest::Client,
    model: String,
}

impl AnthropicApi {
    pub fn new(client: reqwest::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for AnthropicApi {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = api_key("ANTHROPIC_API_KEY")?;
        debug!("Summarizing via Anthropic API with model {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 4096,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let json = read_json(resp, "Anthropic").await?;
        extract_anthropic_text(&json)
    }
}

/// OpenAI Chat Completions API, authenticated with `OPENAI_API_KEY`
#[derive(Debug, Clone)]
pub struct OpenAiApi {
    client: reqwest::Client,
    model: String,
}

impl OpenAiApi {
    pub fn new(client: reqwest::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiApi {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = api_key("OPENAI_API_KEY")?;
        debug!("Summarizing via OpenAI API with model {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let json = read_json(resp, "OpenAI").await?;
        extract_openai_text(&json)
    }
}

fn api_key(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| Error::Summarizer(format!("{var} environment variable not set")))
}

fn request_failed(e: reqwest::Error) -> Error {
    Error::Summarizer(format!("request failed: {e}"))
}

async fn read_json(resp: reqwest::Response, service: &str) -> Result<serde_json::Value> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Summarizer(format!("{service} API returned {status}: {body}")));
    }
    resp.json().await.map_err(request_failed)
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str().map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.trim().is_empty() {
            return Ok(text.trim().to_string());
        }
    }
    Err(Error::Summarizer("unexpected Anthropic API response format".to_string()))
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Summarizer("unexpected OpenAI API response format".to_string()))
}

use clap::{Parser, ValueEnum};
use eyre::{Result, eyre};

use yts::config::Config;
use yts::summarize::{DEFAULT_MODEL, OPENAI_DEFAULT_MODEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Command-line agent run as a subprocess
    Claude,
    /// Anthropic Messages API (ANTHROPIC_API_KEY)
    Anthropic,
    /// OpenAI Chat Completions API (OPENAI_API_KEY)
    #[value(name = "openai")]
    OpenAi,
}

impl Backend {
    /// Model used when neither the flag nor the config names one
    pub fn default_model(&self) -> &'static str {
        match self {
            Backend::Claude | Backend::Anthropic => DEFAULT_MODEL,
            Backend::OpenAi => OPENAI_DEFAULT_MODEL,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "yts",
    about = "Summarize a YouTube video using its subtitles and an LLM",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL
    pub url: String,

    /// Model to summarize with [default: claude-haiku-4-5-20251001, gpt-4o-mini for openai]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Summarization backend [default: claude]
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Agent program used by the claude backend
    #[arg(long, env = "YTS_AGENT")]
    pub agent: Option<String>,

    /// yt-dlp program used for metadata and subtitles
    #[arg(long = "yt-dlp", env = "YTS_YT_DLP")]
    pub yt_dlp: Option<String>,

    /// Subtitle language [default: en]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Show config and transcript details on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Effective settings after layering CLI flags over the config file over defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,
    pub backend: Backend,
    pub agent: String,
    pub yt_dlp: String,
    pub lang: String,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let backend = match (cli.backend, config.default_backend.as_deref()) {
            (Some(backend), _) => backend,
            (None, Some(name)) => {
                Backend::from_str(name, true).map_err(|e| eyre!("invalid default_backend in config: {e}"))?
            }
            (None, None) => Backend::Claude,
        };

        Ok(Self {
            model: pick(cli.model.as_deref(), config.default_model.as_deref(), backend.default_model()),
            backend,
            agent: pick(cli.agent.as_deref(), config.agent.as_deref(), "claude"),
            yt_dlp: pick(cli.yt_dlp.as_deref(), config.yt_dlp.as_deref(), "yt-dlp"),
            lang: pick(cli.lang.as_deref(), config.lang.as_deref(), "en"),
        })
    }
}

fn pick(flag: Option<&str>, configured: Option<&str>, default: &str) -> String {
    flag.or(configured).unwrap_or(default).to_string()
}

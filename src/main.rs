use std::io;
use std::path::PathBuf;
use std::process::Command;

use eyre::{Result, bail};
use log::{debug, info, warn};

use yts::config::Config;
use yts::pipeline::Pipeline;
use yts::summarize::{AnthropicApi, ClaudeCli, OpenAiApi, Summarizer};
use yts::youtube::YtDlp;

mod cli;

use cli::{Backend, Cli, Settings};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("yts.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yts")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn tool_line(name: &str, purpose: &str) -> String {
    match tool_version(name) {
        Some(v) => format!("  \x1b[32m✅\x1b[0m {name:<10} {v}"),
        None => format!("  \x1b[31m❌\x1b[0m {name:<10} (not found, needed for {purpose})"),
    }
}

fn build_after_help(config: &Config) -> String {
    let yt_dlp = std::env::var("YTS_YT_DLP")
        .ok()
        .or_else(|| config.yt_dlp.clone())
        .unwrap_or_else(|| "yt-dlp".to_string());
    let agent = std::env::var("YTS_AGENT")
        .ok()
        .or_else(|| config.agent.clone())
        .unwrap_or_else(|| "claude".to_string());

    let log_path = log_dir().join("yts.log");

    format!(
        "\nREQUIRED TOOLS:\n{}\n{}\n\nLogs are written to: {}",
        tool_line(&yt_dlp, "metadata and subtitles"),
        tool_line(&agent, "the claude backend"),
        log_path.display()
    )
}

fn wants_help() -> bool {
    std::env::args().skip(1).any(|a| a == "-h" || a == "--help")
}

fn build_summarizer(settings: &Settings) -> Box<dyn Summarizer> {
    match settings.backend {
        Backend::Claude => Box::new(ClaudeCli::new(&settings.agent, &settings.model)),
        Backend::Anthropic => Box::new(AnthropicApi::new(reqwest::Client::new(), &settings.model)),
        Backend::OpenAi => Box::new(OpenAiApi::new(reqwest::Client::new(), &settings.model)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logging()?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config: {e:#}");
        Config::default()
    });

    let mut cmd = <Cli as clap::CommandFactory>::command();
    if wants_help() {
        cmd = cmd.after_help(build_after_help(&config));
    }
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let settings = Settings::resolve(&cli, &config)?;
    debug!("Settings: {settings:?}");

    if cli.verbose {
        let config_path = yts::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let source = YtDlp::new(&settings.yt_dlp);
    let summarizer = build_summarizer(&settings);
    let pipeline = Pipeline::new(&source, summarizer.as_ref()).lang(&settings.lang);

    let mut stderr = io::stderr();
    let outcome = tokio::select! {
        result = pipeline.run(&cli.url, &mut stderr) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted by user");
            bail!("interrupted");
        }
    };

    if cli.verbose {
        eprintln!(
            "Video: {}\nSubtitles: {} ({})\nTranscript: {} characters{}",
            outcome.title,
            outcome.subtitle_lang,
            outcome.subtitle_kind,
            outcome.transcript_chars,
            if outcome.truncated { " (truncated)" } else { "" },
        );
    }

    println!("{}", outcome.summary);
    Ok(())
}

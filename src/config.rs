use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_model: Option<String>,
    pub default_backend: Option<String>,
    /// Agent program for the CLI backend
    pub agent: Option<String>,
    pub yt_dlp: Option<String>,
    /// Subtitle language to request
    pub lang: Option<String>,
}

impl Config {
    /// Load config from ~/.config/yts/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file found at {}", path.display());
            return Ok(Config::default());
        }
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("yts")
        .join("config.toml")
}

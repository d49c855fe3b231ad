use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub itunes: ItunesConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItunesConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_entity")]
    pub entity: Vec<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub country: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Event poll interval; completed searches are drained once per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
}

fn default_base_url() -> String {
    "https://itunes.apple.com".to_string()
}

fn default_entity() -> Vec<String> {
    vec![
        "musicArtist".to_string(),
        "album".to_string(),
        "song".to_string(),
    ]
}

fn default_limit() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_tick_ms() -> u64 {
    100
}

fn default_show_timestamps() -> bool {
    true
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            entity: default_entity(),
            limit: default_limit(),
            country: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            show_timestamps: default_show_timestamps(),
        }
    }
}

pub fn tunes_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".tunes")
}

pub fn config_path() -> PathBuf {
    tunes_dir().join("config.toml")
}

pub fn log_dir() -> PathBuf {
    tunes_dir().join("logs")
}

/// Load `~/.tunes/config.toml`, or `path` when given. A missing file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

//! Config module.
//! Manages I/O for fen_render.json (listen address, cache and asset directories).
//! Uses serde for JSON serialization; every field has a default, so a partial
//! file is fine and a missing file means "all defaults".

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "fen_render.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Where rendered PNGs are cached
    pub cache_dir: PathBuf,
    /// Tile and piece sprites
    pub assets_dir: PathBuf,
    /// Draw solid squares when tile sprites are missing instead of failing
    pub plain_tiles_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cache_dir: PathBuf::from("fens"),
            assets_dir: PathBuf::from("img"),
            plain_tiles_fallback: false,
        }
    }
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads the config at `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, json).with_context(|| format!("Failed to write config {}", path.display()))
}

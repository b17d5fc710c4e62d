//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$HELPKIT_CONFIG` environment variable
//! 2. `~/.config/helpkit/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use helpkit_bridge::DEFAULT_MAX_SESSIONS;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub kb: KbConfig,
    pub reply: ReplyConfig,
    pub bridge: BridgeConfig,
}

/// Knowledge base source.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Catalog TOML path. Default: `kb.toml` in the platform config dir,
    /// then the built-in catalog.
    pub path: Option<String>,
}

/// Reply formatting.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Wrap URLs and root-relative paths in links.
    pub linkify: bool,
}

/// Stdio bridge settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Open sessions kept before the least recently active is evicted.
    pub max_sessions: usize,
}

// --- Defaults ---

impl Default for ReplyConfig {
    fn default() -> Self {
        Self { linkify: true }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(p) if p.exists() => load_config_from(&p),
        _ => Ok(Config::default()),
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("HELPKIT_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/helpkit/config.toml
    if let Some(home) = dirs_home() {
        let p = home.join(".config").join("helpkit").join("config.toml");
        return Some(p);
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `helpkit config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

//! Configuration loading.
//!
//! A single optional TOML file; every section and key has a default, so a
//! missing file is equivalent to an empty one.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::client::WritePolicy;
use crate::query::QueryLimits;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Resize-retry bounds for kernel reads.
    #[serde(default)]
    pub query: QueryLimits,

    /// Write-side policy.
    #[serde(default)]
    pub policy: WritePolicy,

    /// CLI output preferences.
    #[serde(default)]
    pub output: OutputConfig,

    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the CLI renders results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `name: value` lines, like `sysctl(8)`.
    #[default]
    Text,
    /// One JSON document.
    Json,
}

/// CLI output preferences.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Print each node's type next to its value.
    #[serde(default)]
    pub show_type: bool,
}

/// Logging preferences.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_owned()
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Load the default config file, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the
/// file exists but cannot be parsed.
pub fn load_default_config() -> anyhow::Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(&path)
}

/// Resolve the default config directory (`~/.sysctl-tree/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".sysctl-tree"))
}

/// Resolve the default config file path.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

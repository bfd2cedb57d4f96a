//! Configuration file loading with precedence handling.

use crate::model::{CoreApp, DedupStrategy, SortOrder};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LOGROWS_CONFIG";
/// Env var overriding the dedup strategy.
pub const DEDUP_ENV_VAR: &str = "LOGROWS_DEDUP";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/logrows/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Wrap long messages.
    #[serde(default)]
    pub wrap_lines: Option<bool>,

    /// Dedup strategy (`none`, `exact`, `numbers`, `signature`).
    #[serde(default)]
    pub dedup: Option<DedupStrategy>,

    /// Sort order (`ascending`, `descending`); arrival order when absent.
    #[serde(default)]
    pub sort_order: Option<SortOrder>,

    /// Enables the text-selection popover.
    #[serde(default)]
    pub popover_menu: Option<bool>,

    /// Execution context tag (`explore`, `dashboard`, ...).
    #[serde(default)]
    pub app: Option<CoreApp>,

    /// Rows rendered beyond each edge of the viewport.
    #[serde(default)]
    pub overscan: Option<usize>,

    /// Height of one visual line, in cells.
    #[serde(default)]
    pub row_height: Option<u32>,

    /// Width of one character, in cells.
    #[serde(default)]
    pub char_width: Option<f64>,

    /// Cells reserved before the message on every row.
    #[serde(default)]
    pub margins: Option<u32>,

    /// Popover width, in cells.
    #[serde(default)]
    pub popover_width: Option<u32>,

    /// Popover height, in cells.
    #[serde(default)]
    pub popover_height: Option<u32>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub wrap_lines: bool,
    pub dedup: DedupStrategy,
    pub sort_order: Option<SortOrder>,
    pub popover_menu: bool,
    pub app: CoreApp,
    pub overscan: usize,
    pub row_height: u32,
    pub char_width: f64,
    pub margins: u32,
    pub popover_width: u32,
    pub popover_height: u32,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            wrap_lines: false,
            dedup: DedupStrategy::None,
            sort_order: None,
            popover_menu: true,
            app: CoreApp::Explore,
            overscan: crate::engine::DEFAULT_OVERSCAN,
            row_height: 1,
            char_width: 1.0,
            margins: crate::view::GUTTER_WIDTH,
            popover_width: 26,
            popover_height: 4,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/logrows/logrows.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("logrows").join("logrows.log")
    } else {
        PathBuf::from("logrows.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/logrows/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logrows").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LOGROWS_CONFIG` environment variable
/// 3. Default path `~/.config/logrows/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// `LOGROWS_DEDUP` overrides the dedup strategy. An unrecognized value is
/// logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(DEDUP_ENV_VAR) {
        match value.parse::<DedupStrategy>() {
            Ok(strategy) => config.dedup = strategy,
            Err(err) => warn!(var = DEDUP_ENV_VAR, error = %err, "Ignoring env override"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        wrap_lines: config.wrap_lines.unwrap_or(defaults.wrap_lines),
        dedup: config.dedup.unwrap_or(defaults.dedup),
        sort_order: config.sort_order.or(defaults.sort_order),
        popover_menu: config.popover_menu.unwrap_or(defaults.popover_menu),
        app: config.app.unwrap_or(defaults.app),
        overscan: config.overscan.unwrap_or(defaults.overscan),
        row_height: config.row_height.unwrap_or(defaults.row_height),
        char_width: config
            .char_width
            .filter(|width| width.is_finite() && *width > 0.0)
            .unwrap_or(defaults.char_width),
        margins: config.margins.unwrap_or(defaults.margins),
        popover_width: config.popover_width.unwrap_or(defaults.popover_width),
        popover_height: config.popover_height.unwrap_or(defaults.popover_height),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    wrap_override: Option<bool>,
    dedup_override: Option<DedupStrategy>,
    sort_override: Option<SortOrder>,
) -> ResolvedConfig {
    if let Some(wrap) = wrap_override {
        config.wrap_lines = wrap;
    }

    if let Some(dedup) = dedup_override {
        config.dedup = dedup;
    }

    if let Some(sort) = sort_override {
        config.sort_order = Some(sort);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

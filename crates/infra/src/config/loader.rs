//! Configuration loader
//!
//! Loads [`BackendConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `PURCHASES_API_KEY` is absent, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whichever source wins, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `PURCHASES_API_KEY`: Public API key (required)
//! - `PURCHASES_BASE_URL`: Backend base URL
//! - `PURCHASES_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `PURCHASES_MAX_ATTEMPTS`: Total attempts per request, including retries
//! - `PURCHASES_BASE_BACKOFF_MS`: Backoff before the first retry
//! - `PURCHASES_USER_AGENT`: User agent sent with every request
//! - `PURCHASES_LOG_LEVEL`: Default tracing filter when `RUST_LOG` is unset
//! - `PURCHASES_JSON_LOGS`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./purchases.json` or `./purchases.toml` (current working directory)
//! 2. `./config/purchases.json` or `./config/purchases.toml`
//! 3. `../purchases.json` or `../purchases.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use purchases_domain::{BackendConfig, ConfigError};

const CONFIG_FILE_NAMES: [&str; 2] = ["purchases.json", "purchases.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the API key is
/// not set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `ConfigError` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load() -> Result<BackendConfig, ConfigError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigError::Missing(key)) => {
            tracing::debug!(missing = %key, "Environment incomplete, trying file");
            load_from_file(None)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// Only `PURCHASES_API_KEY` is required; every other variable falls back to
/// its default.
///
/// # Errors
/// Returns `ConfigError::Missing` if the API key is unset and
/// `ConfigError::Invalid` if a numeric variable cannot be parsed.
pub fn load_from_env() -> Result<BackendConfig, ConfigError> {
    let mut config = BackendConfig::new(env_var("PURCHASES_API_KEY")?);

    if let Some(base_url) = optional_env("PURCHASES_BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(timeout) = env_parse("PURCHASES_TIMEOUT_SECS")? {
        config.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse("PURCHASES_MAX_ATTEMPTS")? {
        config.max_attempts = attempts;
    }
    if let Some(backoff) = env_parse("PURCHASES_BASE_BACKOFF_MS")? {
        config.base_backoff_ms = backoff;
    }
    if let Some(user_agent) = optional_env("PURCHASES_USER_AGENT") {
        config.user_agent = user_agent;
    }
    if let Some(level) = optional_env("PURCHASES_LOG_LEVEL") {
        config.log_level = level;
    }
    config.json_logs = env_bool("PURCHASES_JSON_LOGS", false);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ConfigError` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<BackendConfig, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::Io(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => search_config_paths().ok_or_else(|| {
            ConfigError::Missing("no config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError::Io(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<BackendConfig, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Format(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Format(format!("Invalid JSON format: {e}"))),
        _ => Err(ConfigError::Format(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn search_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for dir in [cwd.clone(), cwd.join("config"), cwd.join("..")] {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)));
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Non-empty value of `key`, if set.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::Invalid(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

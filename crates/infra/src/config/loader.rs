//! Environment configuration loader
//!
//! Resolves the request layer's [`EnvironmentConfig`] once at startup.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment if one exists
//! 2. Uses a config file as the base if one is found, otherwise defaults
//! 3. Overlays any environment variables that are set
//!
//! ## Environment Variables
//! - `CHATWIRE_API_BASE_URL`: Base URL joined with relative request URLs
//! - `CHATWIRE_API_TIMEOUT_MS`: Request timeout in milliseconds
//! - `CHATWIRE_ENV`: `production`/`prod` or `development`/`dev`/`test`
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./chatwire.json` or `./chatwire.toml` (current working directory)
//! 2. `../chatwire.json` or `../chatwire.toml` (parent directory)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};

use chatwire_domain::{ChatwireError, EnvironmentConfig, Result};

pub const ENV_BASE_URL: &str = "CHATWIRE_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "CHATWIRE_API_TIMEOUT_MS";
pub const ENV_ENVIRONMENT: &str = "CHATWIRE_ENV";

/// Load configuration with the full layering strategy.
///
/// # Errors
/// Returns `ChatwireError::Config` if a config file is malformed or an
/// environment variable holds an invalid value.
pub fn load() -> Result<EnvironmentConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Could not load .env file"),
    }

    let base = match find_config_file() {
        Some(path) => load_from_file(Some(path))?,
        None => EnvironmentConfig::default(),
    };

    let config = apply_env(base)?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_ms = config.timeout_ms,
        environment = config.environment_name(),
        "Environment configuration resolved"
    );
    Ok(config)
}

/// Load configuration from environment variables over built-in defaults.
///
/// # Errors
/// Returns `ChatwireError::Config` for unparseable or zero timeouts and
/// unknown environment names.
pub fn load_from_env() -> Result<EnvironmentConfig> {
    apply_env(EnvironmentConfig::default())
}

/// Overlay every set environment variable onto `base`.
fn apply_env(mut config: EnvironmentConfig) -> Result<EnvironmentConfig> {
    if let Some(base_url) = env_var(ENV_BASE_URL) {
        config.base_url = base_url;
    }

    if let Some(raw) = env_var(ENV_TIMEOUT_MS) {
        config.timeout_ms = parse_timeout(&raw)?;
    }

    if let Some(raw) = env_var(ENV_ENVIRONMENT) {
        config.production = parse_environment(&raw)?;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Supports both JSON
/// and TOML formats (detected by file extension); missing fields take their
/// defaults.
///
/// # Errors
/// Returns `ChatwireError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<EnvironmentConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ChatwireError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            ChatwireError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ChatwireError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    if config.timeout_ms == 0 {
        return Err(ChatwireError::Config("timeout_ms must be greater than zero".to_string()));
    }
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<EnvironmentConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ChatwireError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ChatwireError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ChatwireError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search the standard paths for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    const NAMES: [&str; 4] =
        ["chatwire.json", "chatwire.toml", "../chatwire.json", "../chatwire.toml"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Read an environment variable, treating blank values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_timeout(raw: &str) -> Result<u64> {
    let timeout = raw.parse::<u64>().map_err(|e| {
        ChatwireError::Config(format!("Invalid {}: {} ({})", ENV_TIMEOUT_MS, raw, e))
    })?;
    if timeout == 0 {
        return Err(ChatwireError::Config(format!("{} must be greater than zero", ENV_TIMEOUT_MS)));
    }
    Ok(timeout)
}

/// Accepts `production`/`prod` and `development`/`dev`/`test`
/// (case-insensitive).
fn parse_environment(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "production" | "prod" => Ok(true),
        "development" | "dev" | "test" => Ok(false),
        other => Err(ChatwireError::Config(format!(
            "Invalid {}: {} (expected production or development)",
            ENV_ENVIRONMENT, other
        ))),
    }
}

//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `WISHBOT_GATEWAY_URL`: Wish gateway base URL (required)
//! - `WISHBOT_GATEWAY_TOKEN`: Wish gateway access token
//! - `WISHBOT_POLL_INTERVAL`: Poll interval in seconds (required)
//! - `WISHBOT_REFERENCE_TIMEZONE`: IANA reference timezone name (required)
//! - `WISHBOT_CONTACTS_PATH`: Contact snapshot document path
//! - `WISHBOT_EVENTS_PATH`: Event snapshot document path
//! - `WISHBOT_LEDGER_PATH`: Dispatch ledger document path
//! - `WISHBOT_ERROR_HANDLERS_PATH`: Handler binding document path
//! - `WISHBOT_TOKEN_PATH`: Fetcher OAuth token file path
//!
//! Path variables fall back to the default document names in the working
//! directory when unset.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./wishbot.json` or `./wishbot.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use wishbot_domain::{
    Config, DispatchConfig, Result, StoreConfig, TransportConfig, WishBotError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `WishBotError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    // Try loading from environment first
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            // Fall back to file
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The gateway URL, poll interval, and reference timezone are required; the
/// store paths default to the standard document names when unset.
///
/// # Errors
/// Returns `WishBotError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let gateway_url = env_var("WISHBOT_GATEWAY_URL")?;
    let access_token = std::env::var("WISHBOT_GATEWAY_TOKEN").ok();

    let interval_seconds = env_var("WISHBOT_POLL_INTERVAL").and_then(|s| {
        s.parse::<u64>()
            .map_err(|e| WishBotError::Config(format!("Invalid poll interval: {}", e)))
    })?;
    let reference_timezone = env_var("WISHBOT_REFERENCE_TIMEZONE")?;

    let defaults = StoreConfig::default();
    let store = StoreConfig {
        contacts_path: env_or("WISHBOT_CONTACTS_PATH", defaults.contacts_path),
        events_path: env_or("WISHBOT_EVENTS_PATH", defaults.events_path),
        ledger_path: env_or("WISHBOT_LEDGER_PATH", defaults.ledger_path),
        error_handlers_path: env_or("WISHBOT_ERROR_HANDLERS_PATH", defaults.error_handlers_path),
        token_path: env_or("WISHBOT_TOKEN_PATH", defaults.token_path),
    };

    let config = Config {
        dispatch: DispatchConfig { interval_seconds, reference_timezone },
        store,
        transport: TransportConfig { gateway_url, access_token },
    };

    // Reject unknown zone names at load time rather than on the first cycle.
    config.dispatch.timezone()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `WishBotError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(WishBotError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            WishBotError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| WishBotError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.dispatch.timezone()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Arguments
/// * `contents` - File contents as string
/// * `path` - Path to the file (for format detection and error messages)
///
/// # Errors
/// Returns `WishBotError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| WishBotError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WishBotError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(WishBotError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./wishbot.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("wishbot.json"),
            cwd.join("wishbot.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("wishbot.json"),
                exe_dir.join("wishbot.toml"),
                exe_dir.join("../config.json"),
                exe_dir.join("../config.toml"),
                exe_dir.join("../../config.json"),
                exe_dir.join("../../config.toml"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `WishBotError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        WishBotError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Environment variable with a fallback value.
fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

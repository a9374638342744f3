//! Configuration loader
//!
//! Loads scheduling configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment when present
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats; missing fields take defaults
//!
//! ## Environment Variables
//! Required:
//! - `SLOTLINE_CALENDAR_ID`: Calendar searched for events
//! - `SLOTLINE_CLIENT_ID`: OAuth client id
//! - `SLOTLINE_CLIENT_SECRET`: OAuth client secret
//! - `SLOTLINE_REFRESH_TOKEN`: Long-lived refresh token
//!
//! Optional:
//! - `SLOTLINE_FREE_BUSY_CALENDAR_IDS`: Comma-separated calendars for free-busy
//! - `SLOTLINE_ALLOWED_DURATIONS`: Comma-separated durations in minutes
//! - `SLOTLINE_SLOT_INTERVAL_MINUTES`, `SLOTLINE_BUFFER_MINUTES`,
//!   `SLOTLINE_LEAD_TIME_MINUTES`: Slot tuning
//! - `SLOTLINE_OPENING_HOUR`, `SLOTLINE_CLOSING_HOUR`: Business hours
//! - `SLOTLINE_HOME_TIMEZONE`: IANA timezone name
//! - `SLOTLINE_GEOCODING_API_KEY`: Enables geocoding when set
//! - `SLOTLINE_LOG_LEVEL`, `SLOTLINE_LOG_JSON`: Logging
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./slotline.{json,toml}` or `./config.{json,toml}` (current directory)
//! 2. The same names one and two directories up
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use slotline_domain::{Config, Result, SchedulingError};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["slotline.json", "slotline.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SchedulingError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present; everything else
/// keeps its default.
///
/// # Errors
/// Returns `SchedulingError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.calendar.calendar_id = env_var("SLOTLINE_CALENDAR_ID")?;
    config.calendar.client_id = env_var("SLOTLINE_CLIENT_ID")?;
    config.calendar.client_secret = Some(env_var("SLOTLINE_CLIENT_SECRET")?);
    config.calendar.refresh_token = Some(env_var("SLOTLINE_REFRESH_TOKEN")?);

    if let Some(ids) = env_list::<String>("SLOTLINE_FREE_BUSY_CALENDAR_IDS")? {
        config.calendar.free_busy_calendar_ids = ids;
    }

    let scheduling = &mut config.scheduling;
    if let Some(durations) = env_list::<u32>("SLOTLINE_ALLOWED_DURATIONS")? {
        scheduling.allowed_durations = durations;
    }
    if let Some(value) = env_parse("SLOTLINE_SLOT_INTERVAL_MINUTES")? {
        scheduling.slot_interval_minutes = value;
    }
    if let Some(value) = env_parse("SLOTLINE_BUFFER_MINUTES")? {
        scheduling.buffer_minutes = value;
    }
    if let Some(value) = env_parse("SLOTLINE_LEAD_TIME_MINUTES")? {
        scheduling.lead_time_minutes = value;
    }
    if let Some(value) = env_parse("SLOTLINE_OPENING_HOUR")? {
        scheduling.opening_hour = value;
    }
    if let Some(value) = env_parse("SLOTLINE_CLOSING_HOUR")? {
        scheduling.closing_hour = value;
    }
    if let Ok(timezone) = std::env::var("SLOTLINE_HOME_TIMEZONE") {
        scheduling.home_timezone = timezone;
    }

    if let Ok(api_key) = std::env::var("SLOTLINE_GEOCODING_API_KEY") {
        config.geocoding.enabled = true;
        config.geocoding.api_key = Some(api_key);
    }

    if let Ok(level) = std::env::var("SLOTLINE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("SLOTLINE_LOG_JSON", config.logging.json);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SchedulingError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SchedulingError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SchedulingError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SchedulingError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SchedulingError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SchedulingError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SchedulingError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current directory, its two parents, and the same three
/// levels relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    candidate_paths(&roots).into_iter().find(|path| path.exists())
}

fn candidate_paths(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| [root.clone(), root.join(".."), root.join("../..")])
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `SchedulingError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SchedulingError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SchedulingError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse an optional comma-separated list, ignoring empty entries.
fn env_list<T>(key: &str) -> Result<Option<Vec<T>>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| SchedulingError::Config(format!("Invalid entry in {}: {}", key, e)))
        })
        .collect::<Result<Vec<T>>>()
        .map(Some)
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

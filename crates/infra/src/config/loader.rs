//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `SIGNALKEEPER_DB_PATH` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. Otherwise defaults, with the database under the platform data directory
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `SIGNALKEEPER_DB_PATH`: Database file path (required for this source)
//! - `SIGNALKEEPER_DB_POOL_SIZE`: Connection pool size
//! - `SIGNALKEEPER_SAMPLE_INTERVAL_MS`: Sampling interval
//! - `SIGNALKEEPER_SOURCE_TIMEOUT_MS`: Deadline for one foreground-window read
//! - `SIGNALKEEPER_FIRST_NUDGE_THRESHOLD_MS`: Drift time before the first nudge
//! - `SIGNALKEEPER_NUDGE_COOLDOWN_MS`: Minimum gap between nudges
//! - `SIGNALKEEPER_TRACKING_ENABLED`: Whether the sampling loop runs (true/false)
//!
//! ## File Locations
//! `config.{toml,json}` and `signalkeeper.{toml,json}` in the working
//! directory, its two parents, and beside the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use signalkeeper_domain::config::DEFAULT_DB_FILE;
use signalkeeper_domain::{Config, Result, SignalKeeperError};

use crate::errors::InfraError;

const ENV_DB_PATH: &str = "SIGNALKEEPER_DB_PATH";
const ENV_DB_POOL_SIZE: &str = "SIGNALKEEPER_DB_POOL_SIZE";
const ENV_SAMPLE_INTERVAL_MS: &str = "SIGNALKEEPER_SAMPLE_INTERVAL_MS";
const ENV_SOURCE_TIMEOUT_MS: &str = "SIGNALKEEPER_SOURCE_TIMEOUT_MS";
const ENV_FIRST_NUDGE_THRESHOLD_MS: &str = "SIGNALKEEPER_FIRST_NUDGE_THRESHOLD_MS";
const ENV_NUDGE_COOLDOWN_MS: &str = "SIGNALKEEPER_NUDGE_COOLDOWN_MS";
const ENV_TRACKING_ENABLED: &str = "SIGNALKEEPER_TRACKING_ENABLED";

const CONFIG_FILE_NAMES: &[&str] =
    &["config.toml", "config.json", "signalkeeper.toml", "signalkeeper.json"];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `SignalKeeperError::Config` if a source is present but malformed,
/// or if the resulting configuration fails validation.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment incomplete, trying config files");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path))?,
                None => {
                    tracing::info!("No config file found, using defaults");
                    default_config()
                }
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables.
///
/// `SIGNALKEEPER_DB_PATH` must be present; every other variable falls back to
/// its default when unset.
///
/// # Errors
/// Returns `SignalKeeperError::Config` if the database path is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.database.path = PathBuf::from(env_var(ENV_DB_PATH)?);

    if let Some(pool_size) = env_parse::<u32>(ENV_DB_POOL_SIZE)? {
        config.database.pool_size = pool_size;
    }
    if let Some(interval) = env_parse::<u64>(ENV_SAMPLE_INTERVAL_MS)? {
        config.tracking.sample_interval_ms = interval;
    }
    if let Some(timeout) = env_parse::<u64>(ENV_SOURCE_TIMEOUT_MS)? {
        config.tracking.source_timeout_ms = timeout;
    }
    if let Some(threshold) = env_parse::<u64>(ENV_FIRST_NUDGE_THRESHOLD_MS)? {
        config.nudge.first_nudge_threshold_ms = threshold;
    }
    if let Some(cooldown) = env_parse::<u64>(ENV_NUDGE_COOLDOWN_MS)? {
        config.nudge.nudge_cooldown_ms = cooldown;
    }
    config.tracking.enabled = env_bool(ENV_TRACKING_ENABLED, config.tracking.enabled);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and TOML
/// (detected by file extension); missing sections take their defaults.
///
/// # Errors
/// Returns `SignalKeeperError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SignalKeeperError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SignalKeeperError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SignalKeeperError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Defaults with the database placed in the platform data directory
/// (`~/.local/share/signalkeeper`, `~/Library/Application Support/signalkeeper`,
/// ...), or the working directory when none is known.
pub fn default_config() -> Config {
    let mut config = Config::default();
    config.database.path = default_db_path();
    config
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("signalkeeper").join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let parsed: std::result::Result<Config, InfraError> = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from),
        "json" => serde_json::from_str(contents).map_err(InfraError::from),
        _ => {
            return Err(SignalKeeperError::Config(format!(
                "Unsupported config format: {extension}"
            )))
        }
    };
    parsed.map_err(SignalKeeperError::from)
}

/// First existing config file, searching the working directory (and two
/// parents) before the executable's directory (and two parents).
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| candidates_under(root))
        .find(|path| path.is_file())
}

fn candidates_under(root: &Path) -> Vec<PathBuf> {
    ["", "..", "../.."]
        .iter()
        .flat_map(|up| CONFIG_FILE_NAMES.iter().map(move |name| root.join(up).join(name)))
        .collect()
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SignalKeeperError::Config(format!("Missing required environment variable: {key}"))
    })
}

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
            .map_err(|e| SignalKeeperError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use signalkeeper_domain::{LogFormat, ProductivityState};
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: &[&str] = &[
        ENV_DB_PATH,
        ENV_DB_POOL_SIZE,
        ENV_SAMPLE_INTERVAL_MS,
        ENV_SOURCE_TIMEOUT_MS,
        ENV_FIRST_NUDGE_THRESHOLD_MS,
        ENV_NUDGE_COOLDOWN_MS,
        ENV_TRACKING_ENABLED,
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "YES", "on"] {
            std::env::set_var("SK_TEST_BOOL", value);
            assert!(env_bool("SK_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("SK_TEST_BOOL", value);
            assert!(!env_bool("SK_TEST_BOOL", true), "{value} should be false");
        }
        std::env::remove_var("SK_TEST_BOOL");
        assert!(env_bool("SK_TEST_BOOL", true));
    }

    #[test]
    fn load_from_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_DB_PATH, "/tmp/sk-test.db");
        std::env::set_var(ENV_DB_POOL_SIZE, "7");
        std::env::set_var(ENV_SAMPLE_INTERVAL_MS, "1000");
        std::env::set_var(ENV_FIRST_NUDGE_THRESHOLD_MS, "60000");
        std::env::set_var(ENV_TRACKING_ENABLED, "false");

        let config = load_from_env().expect("config from env");
        clear_env();

        assert_eq!(config.database.path, PathBuf::from("/tmp/sk-test.db"));
        assert_eq!(config.database.pool_size, 7);
        assert_eq!(config.tracking.sample_interval_ms, 1000);
        assert_eq!(config.nudge.first_nudge_threshold_ms, 60_000);
        assert_eq!(config.nudge.nudge_cooldown_ms, Config::default().nudge.nudge_cooldown_ms);
        assert!(!config.tracking.enabled);
    }

    #[test]
    fn load_from_env_requires_db_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SignalKeeperError::Config(msg) if msg.contains(ENV_DB_PATH)));
    }

    #[test]
    fn load_from_env_rejects_bad_numbers() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_DB_PATH, "/tmp/sk-test.db");
        std::env::set_var(ENV_DB_POOL_SIZE, "lots");
        let result = load_from_env();
        clear_env();
        assert!(matches!(result, Err(SignalKeeperError::Config(msg)) if msg.contains(ENV_DB_POOL_SIZE)));
    }

    #[test]
    fn load_from_toml_file_with_partial_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("signalkeeper.toml");
        std::fs::write(
            &path,
            r#"
[database]
path = "data/sk.db"

[nudge]
firstNudgeThresholdMs = 120000

[classifier]
use_default_rules = false

[classifier.app_overrides]
Slack = "RED"

[[classifier.title_rules]]
pattern = "standup"
state = "GREEN"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).expect("toml config");
        assert_eq!(config.database.path, PathBuf::from("data/sk.db"));
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.nudge.first_nudge_threshold_ms, 120_000);
        assert!(!config.classifier.use_default_rules);
        assert_eq!(config.classifier.app_overrides.get("Slack"), Some(&ProductivityState::Red));
        assert_eq!(config.classifier.title_rules[0].state, ProductivityState::Green);
        assert_eq!(config.logging.format, LogFormat::Json);
        config.validate().expect("valid");
    }

    #[test]
    fn load_from_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "tracking": { "sample_interval_ms": 2500, "enabled": false } }"#)
            .unwrap();

        let config = load_from_file(Some(path)).expect("json config");
        assert_eq!(config.tracking.sample_interval_ms, 2500);
        assert!(!config.tracking.enabled);
    }

    #[test]
    fn malformed_and_missing_files_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "tracking": "#).unwrap();
        assert!(matches!(load_from_file(Some(path)), Err(SignalKeeperError::Config(_))));

        let missing = dir.path().join("nope.toml");
        assert!(matches!(load_from_file(Some(missing)), Err(SignalKeeperError::Config(_))));

        assert!(parse_config("a: b", Path::new("config.yaml")).is_err());
    }

    #[test]
    fn candidates_cover_both_formats_and_parents() {
        let root = Path::new("/srv/app");
        let candidates = candidates_under(root);
        assert_eq!(candidates.len(), 12);
        assert_eq!(candidates[0], root.join("").join("config.toml"));
        assert!(candidates.contains(&root.join("../..").join("signalkeeper.json")));
    }

    #[test]
    fn default_db_path_ends_with_db_file() {
        assert!(default_db_path().ends_with(DEFAULT_DB_FILE));
    }
}

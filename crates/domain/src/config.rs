//! Application configuration structures
//!
//! Loaded by `signalkeeper_infra::config`. Every section has serde defaults so
//! partial files are accepted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_TICK_GAP_MS, DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_SOURCE_TIMEOUT_MS,
};
use crate::types::{NudgeConfig, ProductivityState};
use crate::{Result, SignalKeeperError};

/// Default database file name under the data directory.
pub const DEFAULT_DB_FILE: &str = "signalkeeper.db";
/// Default r2d2 pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub tracking: TrackingConfig,
    pub nudge: NudgeConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the runtime cannot work with.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(config_error("database.pool_size must be greater than zero"));
        }
        if self.tracking.sample_interval_ms == 0 {
            return Err(config_error("tracking.sample_interval_ms must be greater than zero"));
        }
        if self.tracking.source_timeout_ms == 0 {
            return Err(config_error("tracking.source_timeout_ms must be greater than zero"));
        }
        if self.tracking.max_tick_gap_ms < self.tracking.sample_interval_ms {
            return Err(config_error(
                "tracking.max_tick_gap_ms must be at least tracking.sample_interval_ms",
            ));
        }
        self.nudge.validate().map_err(|e| SignalKeeperError::Config(e.to_string()))?;
        self.classifier.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_DB_FILE), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub sample_interval_ms: u64,
    /// Deadline for a single foreground-window lookup.
    pub source_timeout_ms: u64,
    /// Tick gaps (monotonic, or wall/monotonic divergence) beyond this are
    /// treated as a sleep/resume discontinuity.
    pub max_tick_gap_ms: u64,
    pub enabled: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            max_tick_gap_ms: DEFAULT_MAX_TICK_GAP_MS,
            enabled: true,
        }
    }
}

/// Classification rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Append the built-in rule set after the configured rules.
    pub use_default_rules: bool,
    /// Exact app-name overrides; checked before any title rule.
    pub app_overrides: BTreeMap<String, ProductivityState>,
    /// Case-insensitive title patterns, first match wins.
    pub title_rules: Vec<TitleRuleConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { use_default_rules: true, app_overrides: BTreeMap::new(), title_rules: Vec::new() }
    }
}

impl ClassifierConfig {
    /// Every configured pattern must compile.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::Config` for the first invalid pattern.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.title_rules {
            RegexBuilder::new(&rule.pattern).case_insensitive(true).build().map_err(|e| {
                SignalKeeperError::Config(format!("invalid title pattern '{}': {e}", rule.pattern))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRuleConfig {
    pub pattern: String,
    pub state: ProductivityState,
}

impl TitleRuleConfig {
    pub fn new(pattern: impl Into<String>, state: ProductivityState) -> Self {
        Self { pattern: pattern.into(), state }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), format: LogFormat::Pretty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn config_error(message: &str) -> SignalKeeperError {
    SignalKeeperError::Config(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_interval_and_pool() {
        let mut config = Config::default();
        config.tracking.sample_interval_ms = 0;
        assert!(matches!(config.validate(), Err(SignalKeeperError::Config(_))));

        let mut config = Config::default();
        config.database.pool_size = 0;
        assert!(matches!(config.validate(), Err(SignalKeeperError::Config(_))));
    }

    #[test]
    fn rejects_broken_title_pattern() {
        let mut config = Config::default();
        config.classifier.title_rules.push(TitleRuleConfig::new("(unclosed", ProductivityState::Red));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "tracking": { "sample_interval_ms": 1000 },
                "classifier": { "app_overrides": { "Slack": "RED" } },
                "logging": { "format": "json" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.tracking.sample_interval_ms, 1000);
        assert_eq!(config.tracking.source_timeout_ms, DEFAULT_SOURCE_TIMEOUT_MS);
        assert_eq!(config.classifier.app_overrides["Slack"], ProductivityState::Red);
        assert!(config.classifier.use_default_rules);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.database.pool_size, DEFAULT_DB_POOL_SIZE);
    }
}

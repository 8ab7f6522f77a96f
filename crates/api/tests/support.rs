//! Shared fixtures for api integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use signalkeeper_api::AppContext;
use signalkeeper_domain::{Config, DatabaseConfig};
use signalkeeper_infra::StaticActivitySource;
use tempfile::TempDir;

/// Application context over a throwaway database. The temp dir lives as long
/// as the context.
pub struct TestApp {
    pub ctx: AppContext,
    pub source: StaticActivitySource,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build from the default config after `adjust` has run on it.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let mut config = Config {
            database: DatabaseConfig { path: temp_dir.path().join("signalkeeper.db"), pool_size: 2 },
            ..Config::default()
        };
        config.nudge.show_system_notifications = false;
        config.tracking.sample_interval_ms = 1_000;
        adjust(&mut config);

        let source = StaticActivitySource::new("Code", "lib.rs - signalkeeper");
        let ctx = AppContext::with_adapters(config, Arc::new(source.clone()), None)
            .expect("context should build");

        Self { ctx, source, _temp_dir: temp_dir }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

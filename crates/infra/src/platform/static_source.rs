//! Fixed activity source for headless runs and tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use signalkeeper_core::ActivitySource;
use signalkeeper_domain::{ForegroundWindow, Result as DomainResult, SignalKeeperError};

/// Reports whatever window it was last given. Cloning shares the window.
#[derive(Debug, Clone)]
pub struct StaticActivitySource {
    current: Arc<Mutex<Result<ForegroundWindow, String>>>,
}

impl StaticActivitySource {
    pub fn new(app_name: &str, window_title: &str) -> Self {
        Self { current: Arc::new(Mutex::new(Ok(ForegroundWindow::new(app_name, window_title)))) }
    }

    /// A source that fails every read until a window is set.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self { current: Arc::new(Mutex::new(Err(message.into()))) }
    }

    pub fn set_window(&self, app_name: &str, window_title: &str) {
        *self.current.lock() = Ok(ForegroundWindow::new(app_name, window_title));
    }

    pub fn set_unavailable(&self, message: impl Into<String>) {
        *self.current.lock() = Err(message.into());
    }
}

#[async_trait]
impl ActivitySource for StaticActivitySource {
    async fn foreground(&self) -> DomainResult<ForegroundWindow> {
        self.current.lock().clone().map_err(SignalKeeperError::Platform)
    }
}

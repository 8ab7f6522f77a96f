//! Foreground-window lookup through platform helper commands.
//!
//! - **macOS**: `osascript` asking System Events for the frontmost process
//!   and its front window title
//! - **Linux (X11)**: `xdotool getactivewindow getwindowclassname` and
//!   `getwindowname`
//!
//! Every child process runs on a blocking thread under a `wait-timeout`
//! deadline and is killed when the deadline passes.

use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use signalkeeper_core::ActivitySource;
use signalkeeper_domain::constants::DEFAULT_SOURCE_TIMEOUT_MS;
use signalkeeper_domain::{ForegroundWindow, Result as DomainResult, SignalKeeperError};
use tokio::task;
use wait_timeout::ChildExt;

use crate::database::manager::map_join_error;

#[cfg(target_os = "macos")]
const FRONTMOST_SCRIPT: &str = r#"
tell application "System Events"
    set frontApp to first application process whose frontmost is true
    set appName to name of frontApp
    set windowTitle to ""
    try
        set windowTitle to name of front window of frontApp
    end try
end tell
return appName & linefeed & windowTitle
"#;

/// [`ActivitySource`] backed by `osascript` / `xdotool`.
#[derive(Debug, Clone)]
pub struct CommandActivitySource {
    timeout: Duration,
}

impl Default for CommandActivitySource {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SOURCE_TIMEOUT_MS))
    }
}

impl CommandActivitySource {
    /// `timeout` bounds each helper process, not the whole lookup.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ActivitySource for CommandActivitySource {
    async fn foreground(&self) -> DomainResult<ForegroundWindow> {
        let timeout = self.timeout;
        task::spawn_blocking(move || lookup_foreground(timeout)).await.map_err(map_join_error)?
    }
}

#[cfg(target_os = "macos")]
fn lookup_foreground(timeout: Duration) -> DomainResult<ForegroundWindow> {
    let output = run_with_timeout("osascript", &["-e", FRONTMOST_SCRIPT], timeout)?;
    parse_frontmost_output(&output)
}

#[cfg(target_os = "linux")]
fn lookup_foreground(timeout: Duration) -> DomainResult<ForegroundWindow> {
    let app = run_with_timeout("xdotool", &["getactivewindow", "getwindowclassname"], timeout)?;
    let title = run_with_timeout("xdotool", &["getactivewindow", "getwindowname"], timeout)?;
    Ok(ForegroundWindow::new(app, title))
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn lookup_foreground(_timeout: Duration) -> DomainResult<ForegroundWindow> {
    Err(SignalKeeperError::Platform(format!(
        "foreground window lookup is not supported on {}",
        std::env::consts::OS
    )))
}

/// Split `app\ntitle` as printed by the macOS script. A missing title line
/// is an untitled window; a blank app name is an error.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn parse_frontmost_output(output: &str) -> DomainResult<ForegroundWindow> {
    let (app, title) = output.split_once('\n').unwrap_or((output, ""));
    if app.trim().is_empty() {
        return Err(SignalKeeperError::Platform("no frontmost application reported".to_string()));
    }
    Ok(ForegroundWindow::new(app, title))
}

/// Run `program` with `args`, returning trimmed stdout.
///
/// # Errors
/// `SignalKeeperError::Platform` when the program cannot be spawned, exceeds
/// `timeout` (the child is killed and reaped), exits non-zero, or prints
/// non-UTF-8 output.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> DomainResult<String> {
    tracing::trace!(program, timeout_ms = timeout.as_millis() as u64, "Running helper command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| platform_io_error(program, "spawn", &e))?;

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SignalKeeperError::Platform(format!(
                "{program} timed out after {} ms",
                timeout.as_millis()
            )));
        }
        Err(e) => return Err(platform_io_error(program, "wait", &e)),
    };

    let output = child.wait_with_output().map_err(|e| platform_io_error(program, "output", &e))?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SignalKeeperError::Platform(format!(
            "{program} exited with {}: {}",
            status.code().map_or_else(|| "signal".to_string(), |c| c.to_string()),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| {
        SignalKeeperError::Platform(format!("{program} output is not valid UTF-8: {e}"))
    })?;
    Ok(stdout.trim().to_string())
}

fn platform_io_error(program: &str, operation: &str, err: &std::io::Error) -> SignalKeeperError {
    SignalKeeperError::Platform(format!("{program} {operation} failed: {err}"))
}

//! SignalKeeper - focus tracking daemon
//!
//! `signalkeeper` runs the tracking loop until Ctrl-C.
//! `signalkeeper tools` prints the tool catalogue.
//! `signalkeeper call <tool> [json-args]` runs one tool and prints the result.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use signalkeeper_api::{dispatch, list_tools, AppContext};
use signalkeeper_infra::config;
use signalkeeper_infra::observability::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before config so SIGNALKEEPER_* overrides apply
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => warn!(error = %e, "Could not load .env file"),
    }

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("tools") => {
            print_json(&serde_json::to_value(list_tools())?)?;
            Ok(())
        }
        Some("call") => {
            let Some(name) = args.next() else {
                bail!("usage: signalkeeper call <tool> [json-args]");
            };
            let raw = args.next();
            let tool_args = match raw.as_deref() {
                Some(raw) => serde_json::from_str(raw).context("arguments are not valid JSON")?,
                None => Value::Null,
            };

            let ctx = AppContext::from_config(config)?;
            let response = match dispatch(&ctx, &name, tool_args).await {
                Ok(value) => value,
                Err(err) => err.to_response(),
            };
            print_json(&response)
        }
        Some(other) => bail!("unknown subcommand '{other}' (expected 'tools' or 'call')"),
        None => run_daemon(config).await,
    }
}

async fn run_daemon(config: signalkeeper_domain::Config) -> Result<()> {
    info!("SignalKeeper starting...");
    let ctx = AppContext::from_config(config)?;
    let running = ctx.start().await?;
    info!(running, "SignalKeeper initialized successfully");

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");
    ctx.shutdown().await?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

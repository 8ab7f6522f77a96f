//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing and logging.

use std::future::Future;
use std::time::Instant;

use signalkeeper_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Execute a command with automatic timing and logging
///
/// # Example
///
/// ```rust,ignore
/// pub async fn my_command(ctx: &AppContext) -> DomainResult<MyResponse> {
///     execute_command("my_module::my_command", async {
///         ctx.some_service.do_something().await
///     })
///     .await
/// }
/// ```
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command.await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}

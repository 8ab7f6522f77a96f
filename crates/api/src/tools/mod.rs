//! Tool-call surface
//!
//! A tool takes a JSON argument object and returns a JSON value, or a
//! [`ToolError`] whose [`ToolError::to_response`] is the wire shape. Argument
//! objects are validated before any command runs.

mod args;
mod error;
mod registry;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use signalkeeper_domain::utils::dates::parse_date;
use signalkeeper_domain::NewTask;
use tracing::debug;

pub use error::{ToolError, ToolErrorKind};
pub use registry::{list_tools, ArgSpec, ToolSpec};

use self::args::{
    parse_optional_date, BacklogArgs, DayArgs, DeferArgs, NoArgs, NudgeConfigPatch, QueueArgs,
    RangeArgs, SnoozeArgs, TaskIdArgs, UpdateArgs, WeekArgs,
};
use crate::commands;
use crate::AppContext;

/// Run the tool `name` with `args`. `null` is treated as an empty object.
///
/// # Errors
/// `validation` for an unknown tool, malformed arguments or rejected input;
/// `not_found` for a missing task; `runtime` for anything else.
pub async fn dispatch(ctx: &AppContext, name: &str, args: Value) -> Result<Value, ToolError> {
    if registry::find(name).is_none() {
        return Err(ToolError::validation(format!("unknown tool '{name}'")));
    }
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => args,
        other => {
            return Err(ToolError::validation(format!(
                "arguments must be a JSON object, got {other}"
            )))
        }
    };
    debug!(tool = name, "Dispatching tool call");

    match name {
        "stats_get_day" => {
            let DayArgs { date } = parse(args)?;
            let date = parse_optional_date(date.as_deref())?;
            to_json(commands::stats_get_day(ctx, date).await?)
        }
        "stats_get_range" => {
            let RangeArgs { start_date, end_date } = parse(args)?;
            let (start, end) = (parse_date(&start_date)?, parse_date(&end_date)?);
            to_json(commands::stats_get_range(ctx, start, end).await?)
        }
        "stats_get_week" => {
            let WeekArgs { week_offset } = parse(args)?;
            to_json(commands::stats_get_week(ctx, week_offset).await?)
        }
        "stats_get_streak" => {
            let NoArgs {} = parse(args)?;
            to_json(commands::stats_get_streak(ctx).await?)
        }
        "stats_get_insights" => {
            let NoArgs {} = parse(args)?;
            to_json(commands::stats_get_insights(ctx).await?)
        }
        "task_signal_queue" => {
            let QueueArgs { limit } = parse(args)?;
            to_json(commands::task_signal_queue(ctx, limit).await?)
        }
        "task_backlog" => {
            let BacklogArgs { category_id, limit } = parse(args)?;
            to_json(commands::task_backlog(ctx, category_id.as_deref(), limit).await?)
        }
        "task_create" => {
            let input: NewTask = parse(args)?;
            to_json(commands::task_create(ctx, input).await?)
        }
        "task_get" => {
            let TaskIdArgs { id } = parse(args)?;
            to_json(commands::task_get(ctx, &id).await?)
        }
        "task_update" => {
            let UpdateArgs { id, update } = parse(args)?;
            to_json(commands::task_update(ctx, &id, update).await?)
        }
        "task_start" => {
            let TaskIdArgs { id } = parse(args)?;
            to_json(commands::task_start(ctx, &id).await?)
        }
        "task_complete" => {
            let TaskIdArgs { id } = parse(args)?;
            to_json(commands::task_complete(ctx, &id).await?)
        }
        "task_defer" => {
            let DeferArgs { id, until } = parse(args)?;
            let until = parse_optional_date(until.as_deref())?;
            to_json(commands::task_defer(ctx, &id, until).await?)
        }
        "task_delete" => {
            let TaskIdArgs { id } = parse(args)?;
            let success = commands::task_delete(ctx, &id).await?;
            Ok(json!({ "success": success }))
        }
        "nudge_get_config" => {
            let NoArgs {} = parse(args)?;
            to_json(commands::nudge_get_config(ctx).await?)
        }
        "nudge_set_config" => {
            let patch: NudgeConfigPatch = parse(args)?;
            to_json(commands::nudge_update_config(ctx, move |current| patch.apply(current)).await?)
        }
        "nudge_get_drift_status" => {
            let NoArgs {} = parse(args)?;
            to_json(commands::nudge_get_drift_status(ctx).await?)
        }
        "nudge_snooze_app" => {
            let SnoozeArgs { app_name, minutes } = parse(args)?;
            to_json(commands::nudge_snooze_app(ctx, &app_name, minutes).await?)
        }
        "nudge_active_snoozes" => {
            let NoArgs {} = parse(args)?;
            to_json(commands::nudge_active_snoozes(ctx).await?)
        }
        "tracking_get_status" => {
            let NoArgs {} = parse(args)?;
            to_json(commands::tracking_get_status(ctx).await?)
        }
        "tracking_toggle_pause" => {
            let NoArgs {} = parse(args)?;
            let paused = commands::tracking_toggle_pause(ctx).await?;
            Ok(json!({ "paused": paused }))
        }
        "list_tools" => {
            let NoArgs {} = parse(args)?;
            to_json(list_tools())
        }
        _ => Err(ToolError::validation(format!("unknown tool '{name}'"))),
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    Ok(serde_json::from_value(args)?)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|err| ToolError::runtime(format!("failed to serialize result: {err}")))
}

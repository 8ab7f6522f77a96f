//! Score, streak and insight commands

use chrono::NaiveDate;
use signalkeeper_domain::utils::dates::today_local;
use signalkeeper_domain::{DayReport, Insights, RangeReport, Result, StreakReport};

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

/// Stats for `date` (default today).
pub async fn stats_get_day(ctx: &AppContext, date: Option<NaiveDate>) -> Result<DayReport> {
    execute_command("stats::get_day", async {
        let today = today_local();
        ctx.scores.get_day(date.unwrap_or(today), today).await
    })
    .await
}

pub async fn stats_get_range(
    ctx: &AppContext,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<RangeReport> {
    execute_command("stats::get_range", ctx.scores.get_range(start_date, end_date)).await
}

/// Sunday–Saturday week; `week_offset` 0 is the current week, -1 the one
/// before.
pub async fn stats_get_week(ctx: &AppContext, week_offset: Option<i64>) -> Result<RangeReport> {
    execute_command(
        "stats::get_week",
        ctx.scores.get_week(week_offset.unwrap_or(0), today_local()),
    )
    .await
}

pub async fn stats_get_streak(ctx: &AppContext) -> Result<StreakReport> {
    execute_command("stats::get_streak", ctx.scores.get_streak(today_local())).await
}

pub async fn stats_get_insights(ctx: &AppContext) -> Result<Insights> {
    execute_command("stats::get_insights", ctx.scores.insights(today_local())).await
}

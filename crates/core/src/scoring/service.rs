//! Score service - day/range/streak/insight queries and day close-out
//!
//! Queries are computed from samples and tasks on demand. Only
//! [`ScoreService::close_out_day`] writes `daily_stats`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use signalkeeper_domain::constants::{INSIGHTS_TOP_APPS, INSIGHTS_WINDOW_DAYS, MAX_RANGE_DAYS};
use signalkeeper_domain::utils::dates::{
    days_between, each_day, local_day_bounds, local_range_bounds, week_bounds,
};
use signalkeeper_domain::{
    DailyStats, DayReport, Insights, RangeReport, Result, SignalKeeperError, StreakReport,
    TaskStatus,
};
use tracing::{debug, info};

use super::ports::DailyStatsRepository;
use super::score::{
    app_usage, average_score, build_day, completion_rate, completions_by_local_day, day_summary,
    group_by_local_day, most_distracting, most_productive, next_streak, range_totals,
    streak_report, task_breakdown,
};
use crate::tasks::ports::TaskRepository;
use crate::tracking::ports::ActivitySampleRepository;

pub struct ScoreService {
    samples: Arc<dyn ActivitySampleRepository>,
    stats: Arc<dyn DailyStatsRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl ScoreService {
    pub fn new(
        samples: Arc<dyn ActivitySampleRepository>,
        stats: Arc<dyn DailyStatsRepository>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        Self { samples, stats, tasks }
    }

    /// Stats for one local day plus summary figures.
    ///
    /// The streak is the stored one if the day has been closed out, otherwise
    /// a provisional value derived from the previous stored row.
    pub async fn get_day(&self, date: NaiveDate, today: NaiveDate) -> Result<DayReport> {
        if date > today {
            return Err(SignalKeeperError::InvalidInput(format!(
                "date {date} is in the future"
            )));
        }

        let mut stats = self.aggregate_day(date).await?;
        stats.streak = match self.stats.get_day(date).await? {
            Some(stored) => stored.streak,
            None => {
                let previous = self.stats.latest_before(date).await?;
                next_streak(previous.as_ref(), date, stats.signal_score)
            }
        };

        let summary = day_summary(&stats, today);
        Ok(DayReport { stats, summary })
    }

    /// Per-day breakdown for `start..=end` (days with at least one sample),
    /// totals and the unweighted mean score.
    pub async fn get_range(&self, start: NaiveDate, end: NaiveDate) -> Result<RangeReport> {
        validate_range(start, end)?;

        let (from, to) = local_range_bounds(start, end);
        let by_day = group_by_local_day(self.samples.samples_between(from, to).await?);
        let completions =
            completions_by_local_day(&self.tasks.tasks_updated_between(from, to).await?);
        let stored: HashMap<NaiveDate, DailyStats> = self
            .stats
            .get_range(start, end)
            .await?
            .into_iter()
            .map(|row| (row.date, row))
            .collect();

        let mut previous = self.stats.latest_before(start).await?;
        let mut days = Vec::new();
        for day in each_day(start, end) {
            let stored_row = stored.get(&day);
            let Some(samples) = by_day.get(&day) else {
                if let Some(row) = stored_row {
                    previous = Some(row.clone());
                }
                continue;
            };

            let completed = completions.get(&day).copied().unwrap_or(0);
            let mut stats = build_day(day, samples, completed, 0);
            stats.streak = match stored_row {
                Some(row) => row.streak,
                None => next_streak(previous.as_ref(), day, stats.signal_score),
            };
            previous = Some(stats.clone());
            days.push(stats);
        }

        debug!(%start, %end, days = days.len(), "Computed range report");
        Ok(RangeReport {
            start_date: start,
            end_date: end,
            totals: range_totals(&days),
            average_score: average_score(&days),
            days,
        })
    }

    /// Range report for the Sunday-Saturday week `week_offset` weeks from
    /// the current one (0 = this week, -1 = last week).
    pub async fn get_week(&self, week_offset: i64, today: NaiveDate) -> Result<RangeReport> {
        if week_offset > 0 {
            return Err(SignalKeeperError::InvalidInput(format!(
                "weekOffset must be 0 or negative, got {week_offset}"
            )));
        }
        if week_offset < -(MAX_RANGE_DAYS / 7) {
            return Err(SignalKeeperError::InvalidInput(format!(
                "weekOffset must be at least {}, got {week_offset}",
                -(MAX_RANGE_DAYS / 7)
            )));
        }
        let (start, end) = week_bounds(today, week_offset);
        self.get_range(start, end).await
    }

    pub async fn get_streak(&self, today: NaiveDate) -> Result<StreakReport> {
        let latest = self.stats.latest().await?;
        Ok(streak_report(latest.as_ref(), today))
    }

    /// App and task insights over the last seven local days, today included.
    pub async fn insights(&self, today: NaiveDate) -> Result<Insights> {
        let start = today - Duration::days(INSIGHTS_WINDOW_DAYS - 1);
        let (from, to) = local_range_bounds(start, today);

        let samples = self.samples.samples_between(from, to).await?;
        let usage = app_usage(&samples);
        let tasks = self.tasks.tasks_updated_between(from, to).await?;
        let breakdown = task_breakdown(&tasks);

        Ok(Insights {
            start_date: start,
            end_date: today,
            top_apps: usage.iter().take(INSIGHTS_TOP_APPS).cloned().collect(),
            most_productive_apps: most_productive(&usage, INSIGHTS_TOP_APPS),
            most_distracting_apps: most_distracting(&usage, INSIGHTS_TOP_APPS),
            completion_rate: completion_rate(&breakdown),
            task_breakdown: breakdown,
        })
    }

    /// Re-aggregate `date` and store it.
    ///
    /// Minutes, score and task count are refreshed on every call. The streak
    /// is decided the first time the row is written and never changed.
    pub async fn close_out_day(&self, date: NaiveDate) -> Result<DailyStats> {
        let mut stats = self.aggregate_day(date).await?;
        stats.streak = match self.stats.get_day(date).await? {
            Some(existing) => existing.streak,
            None => {
                let previous = self.stats.latest_before(date).await?;
                next_streak(previous.as_ref(), date, stats.signal_score)
            }
        };

        let stored = self.stats.upsert_preserving_streak(stats).await?;
        info!(
            %date,
            signal_score = stored.signal_score,
            streak = stored.streak,
            tasks_completed = stored.tasks_completed,
            "Day closed out"
        );
        Ok(stored)
    }

    /// Close out yesterday if it has no stored row yet.
    pub async fn catch_up(&self, today: NaiveDate) -> Result<Option<DailyStats>> {
        let Some(yesterday) = today.pred_opt() else {
            return Ok(None);
        };
        if self.stats.get_day(yesterday).await?.is_some() {
            debug!(%yesterday, "Previous day already closed out");
            return Ok(None);
        }
        self.close_out_day(yesterday).await.map(Some)
    }

    async fn aggregate_day(&self, date: NaiveDate) -> Result<DailyStats> {
        let (start, end) = local_day_bounds(date);
        let samples = self.samples.samples_between(start, end).await?;
        let tasks_completed = self
            .tasks
            .tasks_updated_between(start, end)
            .await?
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        Ok(build_day(date, &samples, u32::try_from(tasks_completed).unwrap_or(u32::MAX), 0))
    }
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    let span = days_between(start, end);
    if span < 0 {
        return Err(SignalKeeperError::InvalidInput(format!(
            "startDate {start} is after endDate {end}"
        )));
    }
    if span >= MAX_RANGE_DAYS {
        return Err(SignalKeeperError::InvalidInput(format!(
            "range may cover at most {MAX_RANGE_DAYS} days"
        )));
    }
    Ok(())
}

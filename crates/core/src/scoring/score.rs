//! Pure aggregation functions over samples, stats rows and tasks

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use signalkeeper_domain::constants::{NEUTRAL_SIGNAL_SCORE, PRODUCTIVE_SCORE_THRESHOLD};
use signalkeeper_domain::utils::dates::{days_between, local_date_of};
use signalkeeper_domain::{
    ActivitySample, AppUsage, DailyStats, DaySummary, MinuteTotals, ProductivityState,
    RangeTotals, StreakReport, Task, TaskStatus, TaskStatusBreakdown,
};

/// `round(((green - red) / total + 1) * 50)`, or 50 when nothing was tracked.
///
/// ```
/// use signalkeeper_core::calculate_signal_score;
///
/// assert_eq!(calculate_signal_score(0, 0, 0), 50);
/// assert_eq!(calculate_signal_score(40, 10, 10), 75);
/// assert_eq!(calculate_signal_score(0, 30, 0), 50);
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn calculate_signal_score(green: u32, amber: u32, red: u32) -> u8 {
    let total = u64::from(green) + u64::from(amber) + u64::from(red);
    if total == 0 {
        return NEUTRAL_SIGNAL_SCORE;
    }
    let balance = (f64::from(green) - f64::from(red)) / total as f64;
    ((balance + 1.0) * 50.0).round().clamp(0.0, 100.0) as u8
}

/// Strictly above the productive threshold.
pub fn is_productive(score: u8) -> bool {
    score > PRODUCTIVE_SCORE_THRESHOLD
}

/// Sum seconds per state, then round each state total to whole minutes.
pub fn minute_totals<'a, I>(samples: I) -> MinuteTotals
where
    I: IntoIterator<Item = &'a ActivitySample>,
{
    let (mut green, mut amber, mut red) = (0_i64, 0_i64, 0_i64);
    for sample in samples {
        let seconds = sample.duration_seconds.max(0);
        match sample.state {
            ProductivityState::Green => green += seconds,
            ProductivityState::Amber => amber += seconds,
            ProductivityState::Red => red += seconds,
        }
    }
    MinuteTotals {
        green_minutes: seconds_to_minutes(green),
        amber_minutes: seconds_to_minutes(amber),
        red_minutes: seconds_to_minutes(red),
    }
}

fn seconds_to_minutes(seconds: i64) -> u32 {
    u32::try_from((seconds.max(0) + 30) / 60).unwrap_or(u32::MAX)
}

/// Share of tracked minutes that were GREEN, 0..=100.
pub fn productive_percentage(minutes: &MinuteTotals) -> u8 {
    let total = minutes.total();
    if total == 0 {
        return 0;
    }
    percentage(minutes.green_minutes, total)
}

fn percentage(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (u64::from(part) * 100 + u64::from(whole) / 2) / u64::from(whole);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

/// Streak value for `date` given the most recent earlier row.
///
/// A productive day extends the previous day's streak, or starts at 1 when the
/// previous row is missing or not from the day before.
pub fn next_streak(previous: Option<&DailyStats>, date: NaiveDate, score: u8) -> u32 {
    if !is_productive(score) {
        return 0;
    }
    match previous {
        Some(prev) if days_between(prev.date, date) == 1 => prev.streak.saturating_add(1),
        _ => 1,
    }
}

/// Assemble a day's row from its samples. `streak` is supplied by the caller.
pub fn build_day<'a, I>(date: NaiveDate, samples: I, tasks_completed: u32, streak: u32) -> DailyStats
where
    I: IntoIterator<Item = &'a ActivitySample>,
{
    let minutes = minute_totals(samples);
    DailyStats {
        date,
        green_minutes: minutes.green_minutes,
        amber_minutes: minutes.amber_minutes,
        red_minutes: minutes.red_minutes,
        signal_score: calculate_signal_score(
            minutes.green_minutes,
            minutes.amber_minutes,
            minutes.red_minutes,
        ),
        tasks_completed,
        streak,
    }
}

pub fn day_summary(stats: &DailyStats, today: NaiveDate) -> DaySummary {
    let minutes = stats.minutes();
    DaySummary {
        total_tracked_minutes: minutes.total(),
        productive_percentage: productive_percentage(&minutes),
        is_today: stats.date == today,
    }
}

/// Bucket samples by the local calendar day of their start timestamp.
pub fn group_by_local_day(
    samples: Vec<ActivitySample>,
) -> BTreeMap<NaiveDate, Vec<ActivitySample>> {
    let mut days: BTreeMap<NaiveDate, Vec<ActivitySample>> = BTreeMap::new();
    for sample in samples {
        days.entry(local_date_of(sample.timestamp)).or_default().push(sample);
    }
    days
}

/// Completed tasks per local day of their last update.
pub fn completions_by_local_day(tasks: &[Task]) -> HashMap<NaiveDate, u32> {
    let mut counts = HashMap::new();
    for task in tasks.iter().filter(|t| t.status == TaskStatus::Completed) {
        *counts.entry(local_date_of(task.updated_at)).or_insert(0) += 1;
    }
    counts
}

pub fn range_totals(days: &[DailyStats]) -> RangeTotals {
    days.iter().fold(RangeTotals::default(), |mut acc, day| {
        acc.green_minutes += day.green_minutes;
        acc.amber_minutes += day.amber_minutes;
        acc.red_minutes += day.red_minutes;
        acc.total_tracked_minutes += day.total_minutes();
        acc.tasks_completed += day.tasks_completed;
        acc
    })
}

/// Unweighted mean of daily scores, `None` for an empty range.
pub fn average_score(days: &[DailyStats]) -> Option<f64> {
    if days.is_empty() {
        return None;
    }
    let sum: f64 = days.iter().map(|d| f64::from(d.signal_score)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / days.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

/// Streak view of the most recent row. Only a row from today or yesterday
/// keeps the streak alive.
pub fn streak_report(latest: Option<&DailyStats>, today: NaiveDate) -> StreakReport {
    let Some(latest) = latest else {
        return StreakReport {
            streak: 0,
            last_recorded_date: None,
            last_signal_score: None,
            is_active: false,
            message: "No days recorded yet.".to_string(),
        };
    };

    let age = days_between(latest.date, today);
    let is_active = (0..=1).contains(&age);
    let streak = if is_active { latest.streak } else { 0 };
    let message = match (is_active, streak) {
        (false, _) => format!("Streak lapsed: last recorded day was {}.", latest.date),
        (true, 0) => format!(
            "No active streak. Score above {PRODUCTIVE_SCORE_THRESHOLD} to start one."
        ),
        (true, 1) => "1-day streak. Keep it going!".to_string(),
        (true, n) => format!("{n}-day streak. Keep it going!"),
    };

    StreakReport {
        streak,
        last_recorded_date: Some(latest.date),
        last_signal_score: Some(latest.signal_score),
        is_active,
        message,
    }
}

/// Per-app minutes, largest total first (ties by name).
pub fn app_usage(samples: &[ActivitySample]) -> Vec<AppUsage> {
    let mut by_app: HashMap<&str, Vec<&ActivitySample>> = HashMap::new();
    for sample in samples {
        by_app.entry(sample.app_name.as_str()).or_default().push(sample);
    }

    let mut usage: Vec<AppUsage> = by_app
        .into_iter()
        .map(|(app, samples)| {
            let minutes = minute_totals(samples);
            AppUsage {
                app_name: app.to_string(),
                total_minutes: minutes.total(),
                green_minutes: minutes.green_minutes,
                amber_minutes: minutes.amber_minutes,
                red_minutes: minutes.red_minutes,
            }
        })
        .collect();
    usage.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes).then(a.app_name.cmp(&b.app_name)));
    usage
}

/// Apps with more green than red, by green minutes.
pub fn most_productive(usage: &[AppUsage], limit: usize) -> Vec<AppUsage> {
    let mut apps: Vec<AppUsage> =
        usage.iter().filter(|u| u.green_minutes > u.red_minutes).cloned().collect();
    apps.sort_by(|a, b| b.green_minutes.cmp(&a.green_minutes).then(a.app_name.cmp(&b.app_name)));
    apps.truncate(limit);
    apps
}

/// Apps with more red than green, by red minutes.
pub fn most_distracting(usage: &[AppUsage], limit: usize) -> Vec<AppUsage> {
    let mut apps: Vec<AppUsage> =
        usage.iter().filter(|u| u.red_minutes > u.green_minutes).cloned().collect();
    apps.sort_by(|a, b| b.red_minutes.cmp(&a.red_minutes).then(a.app_name.cmp(&b.app_name)));
    apps.truncate(limit);
    apps
}

pub fn task_breakdown(tasks: &[Task]) -> TaskStatusBreakdown {
    tasks.iter().fold(TaskStatusBreakdown::default(), |mut acc, task| {
        match task.status {
            TaskStatus::Pending => acc.pending += 1,
            TaskStatus::InProgress => acc.in_progress += 1,
            TaskStatus::Completed => acc.completed += 1,
            TaskStatus::Deferred => acc.deferred += 1,
        }
        acc.total += 1;
        acc
    })
}

/// Completed share of all counted tasks, 0..=100.
pub fn completion_rate(breakdown: &TaskStatusBreakdown) -> u8 {
    percentage(breakdown.completed, breakdown.total)
}

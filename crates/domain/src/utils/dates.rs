//! Local calendar-day helpers
//!
//! Days are local calendar days. Storage keeps UTC timestamps, so every
//! per-day query goes through [`local_day_bounds`].

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};

use crate::{Result, SignalKeeperError};

/// Wire format for dates in tool arguments and results.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's local date.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Local date a UTC instant falls on.
pub fn local_date_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// UTC instant of local midnight starting `date`.
///
/// Ambiguous midnights resolve to the earlier instant; a midnight skipped by a
/// DST jump resolves to the first valid local time after it.
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    resolve_local(naive)
}

/// Half-open `[start, end)` UTC bounds for a local calendar day.
pub fn local_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (local_midnight(date), local_midnight(next))
}

/// Half-open UTC bounds covering local days `start..=end`.
pub fn local_range_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let (from, _) = local_day_bounds(start);
    let (_, to) = local_day_bounds(end);
    (from, to)
}

/// Sunday-to-Saturday week containing `today`, shifted by `week_offset`
/// weeks (negative = past).
pub fn week_bounds(today: NaiveDate, week_offset: i64) -> (NaiveDate, NaiveDate) {
    let back = i64::from(today.weekday().num_days_from_sunday());
    let sunday = today - Duration::days(back) + Duration::weeks(week_offset);
    (sunday, sunday + Duration::days(6))
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|err| {
        SignalKeeperError::InvalidInput(format!("invalid date '{value}' (expected YYYY-MM-DD): {err}"))
    })
}

/// Whole days from `earlier` to `later` (negative when reversed).
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Iterate local dates `start..=end`.
pub fn each_day(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

fn resolve_local(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            Local
                .from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
        }
    }
}

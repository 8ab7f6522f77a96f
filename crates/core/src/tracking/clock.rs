//! Tick timestamps and sleep/resume detection
//!
//! Durations are measured on the monotonic clock; the wall clock only stamps
//! samples and snooze expiries. A tick whose monotonic gap exceeds the
//! configured maximum, or whose wall delta diverges from the monotonic delta
//! by more than that maximum, marks a discontinuity.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// One evaluation instant, read from both clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub mono: Instant,
    pub wall: DateTime<Utc>,
}

impl Tick {
    pub fn new(mono: Instant, wall: DateTime<Utc>) -> Self {
        Self { mono, wall }
    }

    pub fn now() -> Self {
        Self { mono: Instant::now(), wall: Utc::now() }
    }

    /// Advance both clocks by the same amount.
    #[must_use]
    pub fn advanced(self, by: Duration) -> Self {
        let wall_by = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        Self { mono: self.mono + by, wall: self.wall + wall_by }
    }

    /// Monotonic time since `earlier`, zero if `earlier` is later.
    pub fn since(&self, earlier: &Tick) -> Duration {
        self.mono.saturating_duration_since(earlier.mono)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// No previous tick to compare against.
    First,
    Continuous,
    Discontinuous { mono_gap_ms: u64, wall_delta_ms: i64 },
}

impl Continuity {
    pub fn is_break(&self) -> bool {
        matches!(self, Self::Discontinuous { .. })
    }
}

/// Compares consecutive ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    max_gap: Duration,
    last: Option<Tick>,
}

impl TickClock {
    pub fn new(max_gap: Duration) -> Self {
        Self { max_gap, last: None }
    }

    pub fn observe(&mut self, tick: Tick) -> Continuity {
        let Some(last) = self.last.replace(tick) else {
            return Continuity::First;
        };

        let mono_gap = tick.since(&last);
        let mono_gap_ms = u64::try_from(mono_gap.as_millis()).unwrap_or(u64::MAX);
        let wall_delta_ms = (tick.wall - last.wall).num_milliseconds();
        let max_ms = u64::try_from(self.max_gap.as_millis()).unwrap_or(u64::MAX);

        let divergence = (i128::from(wall_delta_ms) - i128::from(mono_gap_ms)).unsigned_abs();
        if mono_gap_ms > max_ms || divergence > u128::from(max_ms) {
            Continuity::Discontinuous { mono_gap_ms, wall_delta_ms }
        } else {
            Continuity::Continuous
        }
    }

    /// Forget the previous tick; the next one reports [`Continuity::First`].
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<Tick> {
        self.last
    }
}

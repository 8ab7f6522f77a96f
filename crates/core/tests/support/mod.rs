//! Shared test helpers for `signalkeeper-core` integration tests.
//!
//! In-memory implementations of every core port, plus scripted activity
//! sources and a recording nudge dispatcher.

#![allow(dead_code)]

pub mod repositories;
pub mod sources;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Local noon of `date` as UTC, safely inside the local calendar day.
pub fn local_noon(date: NaiveDate) -> DateTime<Utc> {
    Local
        .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

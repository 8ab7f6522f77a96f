//! JSON shapes seen by tool callers.

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use signalkeeper_domain::{NudgeConfig, ProductivityState, SignalKeeperError, Task, TaskStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn task_uses_camel_case_and_snake_case_status() {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let task = Task {
        id: "t-1".into(),
        title: "Write report".into(),
        description: None,
        status: TaskStatus::InProgress,
        priority: 2,
        category_id: Some("work".into()),
        scheduled_date: None,
        estimated_days: 1,
        days_worked: 2,
        last_worked_date: Some(date(2024, 3, 2)),
        created_at: created,
        updated_at: created,
    };
    assert!(task.is_overrun());

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["status"], "in_progress");
    assert_eq!(value["categoryId"], "work");
    assert_eq!(value["lastWorkedDate"], "2024-03-02");
    assert_eq!(value["daysWorked"], 2);
}

#[test]
fn nudge_config_accepts_partial_camel_case() {
    let config: NudgeConfig = serde_json::from_value(json!({ "nudgeCooldownMs": 0 })).unwrap();
    assert_eq!(config.nudge_cooldown_ms, 0);
    assert_eq!(config.first_nudge_threshold_ms, NudgeConfig::default().first_nudge_threshold_ms);
    config.validate().unwrap();
}

#[test]
fn states_and_errors_have_stable_wire_names() {
    assert_eq!(serde_json::to_value(ProductivityState::Amber).unwrap(), "AMBER");

    let err = SignalKeeperError::task_not_found("t-9");
    assert_eq!(err.label(), "not_found");
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({ "type": "NotFound", "message": "task 't-9' does not exist" })
    );
}

#[test]
fn stored_enum_names_parse_back() {
    use signalkeeper_domain::DriftPhase;

    assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
    assert_eq!(" Deferred ".parse::<TaskStatus>().unwrap(), TaskStatus::Deferred);
    assert_eq!("snoozed".parse::<DriftPhase>().unwrap(), DriftPhase::Snoozed);
    assert!(matches!("archived".parse::<TaskStatus>(), Err(SignalKeeperError::InvalidInput(_))));
}

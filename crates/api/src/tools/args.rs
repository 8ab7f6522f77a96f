//! Tool argument objects
//!
//! Field names are camelCase; unknown fields are rejected except on
//! `task_update`, whose patch fields are flattened in.

use chrono::NaiveDate;
use serde::Deserialize;
use signalkeeper_domain::utils::dates::parse_date;
use signalkeeper_domain::{NudgeConfig, Result, TaskUpdate};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct NoArgs {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct DayArgs {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RangeArgs {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct WeekArgs {
    #[serde(default)]
    pub week_offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct QueueArgs {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct BacklogArgs {
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct TaskIdArgs {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct DeferArgs {
    pub id: String,
    #[serde(default)]
    pub until: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateArgs {
    pub id: String,
    #[serde(flatten)]
    pub update: TaskUpdate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SnoozeArgs {
    pub app_name: String,
    pub minutes: u32,
}

/// Partial nudge configuration; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct NudgeConfigPatch {
    #[serde(default)]
    pub first_nudge_threshold_ms: Option<u64>,
    #[serde(default)]
    pub nudge_cooldown_ms: Option<u64>,
    #[serde(default)]
    pub show_system_notifications: Option<bool>,
    #[serde(default)]
    pub ai_nudges_enabled: Option<bool>,
}

impl NudgeConfigPatch {
    pub fn apply(&self, current: NudgeConfig) -> NudgeConfig {
        NudgeConfig {
            first_nudge_threshold_ms: self
                .first_nudge_threshold_ms
                .unwrap_or(current.first_nudge_threshold_ms),
            nudge_cooldown_ms: self.nudge_cooldown_ms.unwrap_or(current.nudge_cooldown_ms),
            show_system_notifications: self
                .show_system_notifications
                .unwrap_or(current.show_system_notifications),
            ai_nudges_enabled: self.ai_nudges_enabled.unwrap_or(current.ai_nudges_enabled),
        }
    }
}

pub(crate) fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(parse_date).transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_value::<QueueArgs>(json!({ "limit": 3, "offset": 1 }));
        assert!(err.is_err());
    }

    #[test]
    fn update_args_flatten_patch_fields() {
        let args: UpdateArgs =
            serde_json::from_value(json!({ "id": "t1", "title": "Rename", "priority": 2 }))
                .unwrap();
        assert_eq!(args.id, "t1");
        assert_eq!(args.update.title.as_deref(), Some("Rename"));
        assert_eq!(args.update.priority, Some(2));
        assert!(args.update.description.is_none());
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let current = NudgeConfig::default();
        let patch: NudgeConfigPatch =
            serde_json::from_value(json!({ "nudgeCooldownMs": 0, "aiNudgesEnabled": false }))
                .unwrap();
        let merged = patch.apply(current);
        assert_eq!(merged.first_nudge_threshold_ms, current.first_nudge_threshold_ms);
        assert_eq!(merged.nudge_cooldown_ms, 0);
        assert!(!merged.ai_nudges_enabled);
        assert_eq!(merged.show_system_notifications, current.show_system_notifications);
    }

    #[test]
    fn optional_dates_parse_or_reject() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-03-05")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(parse_optional_date(Some("05/03/2024")).is_err());
    }
}

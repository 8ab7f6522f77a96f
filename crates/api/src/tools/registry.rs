//! Static catalogue of the tools exposed by [`dispatch`](super::dispatch)

use serde::Serialize;

/// One argument of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// A tool name with its argument descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [ArgSpec],
}

const fn arg(
    name: &'static str,
    kind: &'static str,
    required: bool,
    description: &'static str,
) -> ArgSpec {
    ArgSpec { name, kind, required, description }
}

const TASK_ID: ArgSpec = arg("id", "string", true, "Task id");

static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "stats_get_day",
        description: "Daily stats with tracked minutes, productive percentage and score",
        arguments: &[arg("date", "string", false, "YYYY-MM-DD, defaults to today")],
    },
    ToolSpec {
        name: "stats_get_range",
        description: "Per-day stats with totals and average score for an inclusive range",
        arguments: &[
            arg("startDate", "string", true, "YYYY-MM-DD"),
            arg("endDate", "string", true, "YYYY-MM-DD"),
        ],
    },
    ToolSpec {
        name: "stats_get_week",
        description: "Stats for a Sunday-Saturday week",
        arguments: &[arg("weekOffset", "integer", false, "0 for this week, -1 for last week")],
    },
    ToolSpec {
        name: "stats_get_streak",
        description: "Current streak of productive days",
        arguments: &[],
    },
    ToolSpec {
        name: "stats_get_insights",
        description: "Top, productive and distracting apps plus task breakdown for the last 7 days",
        arguments: &[],
    },
    ToolSpec {
        name: "task_signal_queue",
        description: "Next tasks to work on, in-progress first then by priority",
        arguments: &[arg("limit", "integer", false, "Maximum tasks, default 5")],
    },
    ToolSpec {
        name: "task_backlog",
        description: "Pending and in-progress tasks, optionally for one category",
        arguments: &[
            arg("categoryId", "string", false, "Only tasks in this category"),
            arg("limit", "integer", false, "Maximum tasks, default 50"),
        ],
    },
    ToolSpec {
        name: "task_create",
        description: "Create a pending task",
        arguments: &[
            arg("title", "string", true, "Non-empty title"),
            arg("description", "string", false, "Free text"),
            arg("priority", "integer", false, "1 (highest) to 5, default 3"),
            arg("categoryId", "string", false, "Category id"),
            arg("scheduledDate", "string", false, "YYYY-MM-DD"),
            arg("estimatedDays", "integer", false, "Expected days of work, default 1"),
        ],
    },
    ToolSpec { name: "task_get", description: "Fetch one task", arguments: &[TASK_ID] },
    ToolSpec {
        name: "task_update",
        description: "Patch task fields; status may only move a deferred task back to pending",
        arguments: &[
            TASK_ID,
            arg("title", "string", false, "Non-empty title"),
            arg("description", "string", false, "Free text"),
            arg("status", "string", false, "pending"),
            arg("priority", "integer", false, "1 (highest) to 5"),
            arg("categoryId", "string", false, "Category id"),
            arg("scheduledDate", "string", false, "YYYY-MM-DD"),
            arg("estimatedDays", "integer", false, "Expected days of work"),
        ],
    },
    ToolSpec {
        name: "task_start",
        description: "Mark a task in progress and count today as a worked day",
        arguments: &[TASK_ID],
    },
    ToolSpec { name: "task_complete", description: "Mark a task completed", arguments: &[TASK_ID] },
    ToolSpec {
        name: "task_defer",
        description: "Defer a task to a later date",
        arguments: &[TASK_ID, arg("until", "string", false, "YYYY-MM-DD, defaults to tomorrow")],
    },
    ToolSpec { name: "task_delete", description: "Delete a task", arguments: &[TASK_ID] },
    ToolSpec {
        name: "nudge_get_config",
        description: "Current nudge configuration",
        arguments: &[],
    },
    ToolSpec {
        name: "nudge_set_config",
        description: "Update nudge configuration; omitted fields keep their value",
        arguments: &[
            arg("firstNudgeThresholdMs", "integer", false, "Drift before the first nudge, > 0"),
            arg("nudgeCooldownMs", "integer", false, "Minimum gap between nudges"),
            arg("showSystemNotifications", "boolean", false, "Raise OS notifications"),
            arg("aiNudgesEnabled", "boolean", false, "Request AI-written nudges"),
        ],
    },
    ToolSpec {
        name: "nudge_get_drift_status",
        description: "Whether the user is drifting and for how long",
        arguments: &[],
    },
    ToolSpec {
        name: "nudge_snooze_app",
        description: "Suppress nudges for one app",
        arguments: &[
            arg("appName", "string", true, "Application name"),
            arg("minutes", "integer", true, "1 to 1440"),
        ],
    },
    ToolSpec {
        name: "nudge_active_snoozes",
        description: "Snoozes that have not expired",
        arguments: &[],
    },
    ToolSpec {
        name: "tracking_get_status",
        description: "Monitor state and current foreground app",
        arguments: &[],
    },
    ToolSpec {
        name: "tracking_toggle_pause",
        description: "Pause or resume tracking; returns the new paused flag",
        arguments: &[],
    },
    ToolSpec { name: "list_tools", description: "This catalogue", arguments: &[] },
];

/// Every tool accepted by [`dispatch`](super::dispatch), in display order.
pub fn list_tools() -> &'static [ToolSpec] {
    TOOLS
}

pub(crate) fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

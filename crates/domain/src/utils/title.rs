//! Pure string utility functions for app names and window titles

use crate::constants::{MAX_TITLE_LENGTH, TITLE_TRUNCATE_SUFFIX, UNKNOWN_APP_NAME};

/// Collapse internal whitespace and cap the length of a window title.
///
/// # Examples
///
/// ```
/// use signalkeeper_domain::utils::title::normalize_title;
///
/// assert_eq!(normalize_title("  lib.rs \t-  crate "), "lib.rs - crate");
/// assert_eq!(normalize_title(""), "");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, MAX_TITLE_LENGTH)
}

/// Trim an app name; blank names become [`UNKNOWN_APP_NAME`].
///
/// ```
/// use signalkeeper_domain::utils::title::normalize_app_name;
///
/// assert_eq!(normalize_app_name(" Safari "), "Safari");
/// assert_eq!(normalize_app_name("   "), "Unknown");
/// ```
#[must_use]
pub fn normalize_app_name(app_name: &str) -> String {
    let trimmed = app_name.trim();
    if trimmed.is_empty() {
        UNKNOWN_APP_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncate on a char boundary, appending the suffix when shortened.
#[must_use]
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let keep = max_chars.saturating_sub(TITLE_TRUNCATE_SUFFIX.chars().count());
    let mut out: String = input.chars().take(keep).collect();
    out.push_str(TITLE_TRUNCATE_SUFFIX);
    out
}

//! Datetime placeholders in filename templates
//!
//! | Placeholder | Expands to | Range |
//! |-------------|------------|-------|
//! | `%Y%` | Year (4 digits) | 0000-9999 |
//! | `%m%` | Month | 01-12 |
//! | `%d%` | Day of month | 01-31 |
//! | `%H%` | Hour (24h) | 00-23 |
//! | `%M%` | Minute | 00-59 |
//! | `%S%` | Second | 00-59 |
//!
//! Anything else between percent signs is left as written.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Recognized placeholders, in substitution order
pub const PLACEHOLDERS: [&str; 6] = ["%Y%", "%m%", "%d%", "%H%", "%M%", "%S%"];

/// Expand placeholders using the given instant
pub fn expand_datetime<Tz: TimeZone>(template: &str, now: &DateTime<Tz>) -> String {
    if !template.contains('%') {
        return template.to_string();
    }

    let mut resolved = template.to_string();
    for placeholder in PLACEHOLDERS {
        if resolved.contains(placeholder) {
            resolved = resolved.replace(placeholder, &field_value(placeholder, now));
        }
    }
    resolved
}

/// Expand placeholders using the current local time
pub fn expand_datetime_now(template: &str) -> String {
    expand_datetime(template, &Local::now())
}

fn field_value<Tz: TimeZone>(placeholder: &str, now: &DateTime<Tz>) -> String {
    match placeholder {
        "%Y%" => format!("{:04}", now.year()),
        "%m%" => format!("{:02}", now.month()),
        "%d%" => format!("{:02}", now.day()),
        "%H%" => format!("{:02}", now.hour()),
        "%M%" => format!("{:02}", now.minute()),
        "%S%" => format!("{:02}", now.second()),
        other => other.to_string(),
    }
}

//! Human-readable time formatting for status reports.

use chrono::Duration;

/// Formats elapsed time as "N <unit>s ago", using the largest whole unit.
pub fn format_time_ago(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{} ago", plural(days, "day"))
    } else if hours > 0 {
        format!("{} ago", plural(hours, "hour"))
    } else if minutes > 0 {
        format!("{} ago", plural(minutes, "minute"))
    } else {
        format!("{} ago", plural(seconds, "second"))
    }
}

/// Formats remaining time as "in N minutes", falling back to seconds under
/// a minute.
pub fn format_eta(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    if minutes > 0 {
        format!("in {}", plural(minutes, "minute"))
    } else {
        format!("in {}", plural(remaining.num_seconds().max(0), "second"))
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

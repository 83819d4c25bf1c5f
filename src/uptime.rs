//! Turns the elapsed-time string reported by a host into an "online since"
//! timestamp.
//!
//! Hosts report uptime as `"3 days, 3:52:36"` (or just `"3:52:36"` below one
//! day). The stored value is the absolute start time, rendered as
//! `day.month hour:minute` in local time, e.g. `"25.6 13:52"`.
//!
//! Normalization is best-effort: anything that does not parse is returned
//! unchanged.

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Local, TimeZone};
use regex::Regex;
use tracing::trace;

static DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s+days?\s*$").expect("valid days pattern"));

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+):(\d+):(\d+)\s*$").expect("valid clock pattern")
});

const DISPLAY_FORMAT: &str = "%-d.%-m %H:%M";

/// Normalize against the current local time
pub fn format_uptime(raw: &str) -> String {
    format_uptime_at(raw, Local::now())
}

/// Normalize against a fixed reference time
pub fn format_uptime_at<Tz>(raw: &str, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(elapsed) = parse_elapsed(raw) else {
        trace!("uptime '{raw}' not understood, keeping it as is");
        return raw.to_string();
    };

    match now.checked_sub_signed(elapsed) {
        Some(since) => since.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Parse `"<N> day(s), H:MM:SS"` or `"H:MM:SS"` into the elapsed duration
pub fn parse_elapsed(raw: &str) -> Option<Duration> {
    let parts: Vec<&str> = raw.split(", ").collect();

    let (days, clock) = match parts.as_slice() {
        [clock] => (0, *clock),
        [days, clock] => (parse_number(&DAYS, days, 1)?, *clock),
        _ => return None,
    };

    let captures = CLOCK.captures(clock)?;
    let hours = captures[1].parse::<i64>().ok()?;
    let minutes = captures[2].parse::<i64>().ok()?;
    let seconds = captures[3].parse::<i64>().ok()?;

    Duration::try_days(days)?
        .checked_add(&Duration::try_hours(hours)?)?
        .checked_add(&Duration::try_minutes(minutes)?)?
        .checked_add(&Duration::try_seconds(seconds)?)
}

fn parse_number(pattern: &Regex, input: &str, group: usize) -> Option<i64> {
    pattern.captures(input)?.get(group)?.as_str().parse().ok()
}

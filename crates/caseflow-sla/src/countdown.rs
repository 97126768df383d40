//! Human-readable countdowns.
//!
//! Overdue values are always phrased as "Overdue by ..." and never rendered
//! as a bare negative number.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::remaining;
use crate::types::Case;

const MS_PER_MINUTE: u64 = 60_000;
const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;
const MS_PER_HOUR: i64 = 3_600_000;

/// Remaining time for display and filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    /// Signed milliseconds until the effective deadline.
    pub remaining_ms: i64,
    /// True when `remaining_ms <= 0`. Agrees with the `breached` state.
    pub is_overdue: bool,
    /// True while the clock is paused.
    pub is_paused: bool,
    /// Whole days of `|remaining|`.
    pub days: u64,
    /// Hours of `|remaining|` after removing whole days.
    pub hours: u64,
    /// Minutes of `|remaining|` after removing whole hours.
    pub minutes: u64,
    /// Signed whole hours remaining, truncated toward zero.
    pub total_hours: i64,
    /// Display text, e.g. `"2h 15m"` or `"Overdue by 3h 5m"`.
    pub formatted: String,
}

/// Remaining time for `case` at `now`.
///
/// Always returns a value; resolved and closed cases are evaluated at the time
/// their clock stopped and it is up to the caller whether to show them.
#[must_use]
pub fn time_remaining(case: &Case, now: DateTime<Utc>) -> TimeRemaining {
    let remaining_ms = remaining(case, now).num_milliseconds();
    let total_minutes = remaining_ms.unsigned_abs() / MS_PER_MINUTE;
    TimeRemaining {
        remaining_ms,
        is_overdue: remaining_ms <= 0,
        is_paused: case.sla.is_paused() && case.clock_stopped_at().is_none(),
        days: total_minutes / MINUTES_PER_DAY,
        hours: (total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR,
        minutes: total_minutes % MINUTES_PER_HOUR,
        total_hours: remaining_ms / MS_PER_HOUR,
        formatted: format_remaining(remaining_ms),
    }
}

/// Format a signed remaining duration in milliseconds.
#[must_use]
pub fn format_remaining(remaining_ms: i64) -> String {
    if remaining_ms == 0 {
        return "Overdue".to_string();
    }
    let span = format_span(remaining_ms.unsigned_abs());
    if remaining_ms < 0 {
        format!("Overdue by {span}")
    } else {
        span
    }
}

fn format_span(ms: u64) -> String {
    let total_minutes = ms / MS_PER_MINUTE;
    let days = total_minutes / MINUTES_PER_DAY;
    let hours = (total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
    let minutes = total_minutes % MINUTES_PER_HOUR;

    let mut out = String::new();
    if days > 0 {
        let _ = write!(out, "{days}d {hours}h");
    } else if hours > 0 {
        let _ = write!(out, "{hours}h {minutes}m");
    } else if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    } else {
        out.push_str("<1m");
    }
    out
}

//! SLA computations over a case and an explicit `now`.
//!
//! All arithmetic is done on `TimeDelta` (integer nanoseconds) and compared
//! in milliseconds, so repeated pauses never accumulate rounding drift.
//!
//! Paused time pushes the deadline forward:
//!
//! ```text
//! paused    = total_paused + (now - paused_at)      // second term only while paused
//! remaining = (due_at + paused) - now
//! elapsed   = (now - created_at) - paused
//! window    = due_at - created_at                   // the target frozen at creation
//! ```
//!
//! Once a case is resolved or closed, `now` is clamped to the moment its clock
//! stopped. Sums that would leave chrono's range saturate instead of panicking.

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::SlaConfig;
use crate::types::{Case, SlaRecord, SlaState};

/// The instant SLA arithmetic is evaluated at: `now`, or the time the clock
/// stopped if the case was resolved or closed earlier.
#[must_use]
pub fn evaluation_instant(case: &Case, now: DateTime<Utc>) -> DateTime<Utc> {
    match case.clock_stopped_at() {
        Some(stopped_at) if stopped_at < now => stopped_at,
        _ => now,
    }
}

/// Total paused time as of `at`, including the open interval.
#[must_use]
pub fn paused_duration(sla: &SlaRecord, at: DateTime<Utc>) -> TimeDelta {
    let open = match sla.paused_at {
        Some(since) => (at - since).max(TimeDelta::zero()),
        None => TimeDelta::zero(),
    };
    let total = sla.total_paused();
    total.checked_add(&open).unwrap_or(TimeDelta::MAX)
}

/// The SLA window fixed at creation.
#[must_use]
pub fn sla_window(case: &Case) -> TimeDelta {
    case.sla.due_at - case.created_at
}

/// The deadline after adding all paused time up to `now`.
#[must_use]
pub fn effective_due_at(case: &Case, now: DateTime<Utc>) -> DateTime<Utc> {
    let at = evaluation_instant(case, now);
    let paused = paused_duration(&case.sla, at);
    let due_at = case.sla.due_at;
    due_at
        .checked_add_signed(paused)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Signed time left until the effective deadline. Negative when overdue.
#[must_use]
pub fn remaining(case: &Case, now: DateTime<Utc>) -> TimeDelta {
    let at = evaluation_instant(case, now);
    effective_due_at(case, now) - at
}

/// Wall-clock time since creation minus all paused time.
#[must_use]
pub fn effective_elapsed(case: &Case, now: DateTime<Utc>) -> TimeDelta {
    let at = evaluation_instant(case, now);
    let paused = paused_duration(&case.sla, at);
    (at - case.created_at)
        .checked_sub(&paused)
        .unwrap_or(TimeDelta::MIN)
}

/// Classify a remaining duration against a window.
///
/// `breached` when `remaining <= 0`; `at_risk` when
/// `remaining <= window * risk_window_percent / 100`; otherwise `on_track`.
#[must_use]
pub fn classify_remaining(
    remaining: TimeDelta,
    window: TimeDelta,
    risk_window_percent: u8,
) -> SlaState {
    let remaining_ms = remaining.num_milliseconds();
    if remaining_ms <= 0 {
        return SlaState::Breached;
    }
    let threshold_ms = window
        .num_milliseconds()
        .max(0)
        .saturating_mul(i64::from(risk_window_percent))
        / 100;
    if remaining_ms <= threshold_ms {
        SlaState::AtRisk
    } else {
        SlaState::OnTrack
    }
}

/// Compliance state of a case at `now`.
///
/// Exempt cases (resolved or closed) report `on_track`; callers that
/// aggregate should use [`live_state`] to skip them instead.
#[must_use]
pub fn classify(case: &Case, now: DateTime<Utc>, config: &SlaConfig) -> SlaState {
    live_state(case, now, config).unwrap_or(SlaState::OnTrack)
}

/// Compliance state of a live case, or `None` if the case is exempt.
#[must_use]
pub fn live_state(case: &Case, now: DateTime<Utc>, config: &SlaConfig) -> Option<SlaState> {
    if case.is_sla_exempt() {
        return None;
    }
    Some(classify_remaining(
        remaining(case, now),
        sla_window(case),
        config.risk_window_percent,
    ))
}

/// Percentage of the SLA window consumed, excluding paused time.
///
/// Unclamped: values above 100 indicate a breach. A non-positive window
/// reports 100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage_used(case: &Case, now: DateTime<Utc>) -> f64 {
    let window_ms = sla_window(case).num_milliseconds();
    if window_ms <= 0 {
        return 100.0;
    }
    let elapsed_ms = effective_elapsed(case, now).num_milliseconds();
    elapsed_ms as f64 / window_ms as f64 * 100.0
}

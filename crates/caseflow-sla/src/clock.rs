//! SLA clock state machine.
//!
//! Each case's clock is either running or paused. Resolving or closing the
//! case stops it for good.
//!
//! ```text
//!          pause(reason)
//!   ┌─────────┐ ─────────▶ ┌──────────┐
//!   │ Running │            │  Paused  │
//!   └─────────┘ ◀───────── └──────────┘
//!        │        resume        │
//!        │                      │
//!        └──────┐      ┌────────┘
//!               ▼      ▼
//!             ┌──────────┐
//!             │ Stopped  │  (resolved or closed)
//!             └──────────┘
//! ```
//!
//! Pausing a paused clock and resuming a running one are no-ops that report
//! [`Transition::Unchanged`], so duplicate triggers are harmless.

use chrono::{DateTime, Utc};

use crate::types::{Case, CaseStatus, PauseReason, Resolution, SlaRecord};

/// Observable state of a case's SLA clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Time counts against the SLA.
    Running,
    /// Time is frozen.
    Paused {
        /// When the open pause interval began.
        since: DateTime<Utc>,
        /// Why the clock is paused, if recorded.
        reason: Option<PauseReason>,
    },
    /// The case is resolved or closed; the clock stopped at this instant.
    Stopped {
        /// Resolution or close timestamp.
        at: DateTime<Utc>,
    },
}

/// An operator action on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAction {
    /// Suspend the clock.
    Pause,
    /// Restart a suspended clock.
    Resume,
    /// Record the resolution.
    Resolve,
}

/// Outcome of applying a clock action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The record changed.
    Applied,
    /// The action was not valid from the current state; nothing changed.
    Unchanged,
}

impl Transition {
    /// Returns true if the record changed.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Check whether `action` changes anything from `state`.
#[must_use]
pub const fn is_effective(state: ClockState, action: ClockAction) -> bool {
    matches!(
        (state, action),
        (ClockState::Running, ClockAction::Pause | ClockAction::Resolve)
            | (ClockState::Paused { .. }, ClockAction::Resume | ClockAction::Resolve)
    )
}

/// Current clock state of a case.
#[must_use]
pub fn clock_state(case: &Case) -> ClockState {
    if let Some(at) = case.clock_stopped_at() {
        return ClockState::Stopped { at };
    }
    match case.sla.paused_at {
        Some(since) => ClockState::Paused {
            since,
            reason: case.sla.pause_reason,
        },
        None => ClockState::Running,
    }
}

impl SlaRecord {
    /// Open a pause interval at `now`.
    ///
    /// No-op if the clock is already paused.
    pub fn pause(&mut self, reason: PauseReason, now: DateTime<Utc>) -> Transition {
        if self.is_paused() {
            return Transition::Unchanged;
        }
        self.paused_at = Some(now);
        self.pause_reason = Some(reason);
        Transition::Applied
    }

    /// Close the open pause interval at `now` and add it to the total.
    ///
    /// No-op if the clock is running. A `now` earlier than the pause start
    /// contributes nothing.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Transition {
        let Some(paused_at) = self.paused_at.take() else {
            return Transition::Unchanged;
        };
        let interval_ms = u64::try_from((now - paused_at).num_milliseconds()).unwrap_or(0);
        self.total_paused_ms = self.total_paused_ms.saturating_add(interval_ms);
        self.pause_reason = None;
        Transition::Applied
    }
}

/// The case's SLA record after pausing at `now`. The case is not modified.
#[must_use]
pub fn pause_sla(case: &Case, reason: PauseReason, now: DateTime<Utc>) -> SlaRecord {
    let mut sla = case.sla.clone();
    let _ = sla.pause(reason, now);
    sla
}

/// The case's SLA record after resuming at `now`. The case is not modified.
#[must_use]
pub fn resume_sla(case: &Case, now: DateTime<Utc>) -> SlaRecord {
    let mut sla = case.sla.clone();
    let _ = sla.resume(now);
    sla
}

/// Mark a case resolved at `now`.
///
/// `resolved_at` is set once; resolving again changes nothing. An open pause
/// is left in place since SLA computation stops at `resolved_at` anyway.
pub fn resolve(case: &mut Case, now: DateTime<Utc>, summary: Option<String>) -> Transition {
    if case.resolution.is_some() {
        return Transition::Unchanged;
    }
    case.resolution = Some(Resolution {
        resolved_at: now,
        summary,
    });
    case.status = CaseStatus::Resolved;
    case.updated_at = now;
    Transition::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyTable;
    use crate::types::Priority;
    use caseflow_core::{CaseId, CategoryId};
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-06T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn case() -> Case {
        Case::open(
            CaseId::generate(),
            "Credentialing packet stalled",
            Priority::Urgent,
            CategoryId::new("credentialing").unwrap(),
            t0(),
            &PolicyTable::default(),
        )
    }

    #[test]
    fn pause_then_resume_accumulates() {
        let mut sla = case().sla;
        let paused = sla.pause(PauseReason::AwaitingProvider, t0() + TimeDelta::hours(1));
        assert!(paused.is_applied());
        assert_eq!(sla.pause_reason, Some(PauseReason::AwaitingProvider));

        assert!(sla.resume(t0() + TimeDelta::hours(5)).is_applied());
        assert_eq!(sla.total_paused(), TimeDelta::hours(4));
        assert!(sla.paused_at.is_none());
        assert!(sla.pause_reason.is_none());
    }

    #[test]
    fn double_pause_is_noop() {
        let mut sla = case().sla;
        let first = t0() + TimeDelta::minutes(10);
        assert!(sla.pause(PauseReason::AwaitingProvider, first).is_applied());
        let second = sla.pause(PauseReason::AwaitingMember, first + TimeDelta::minutes(5));
        assert_eq!(second, Transition::Unchanged);
        assert_eq!(sla.paused_at, Some(first));
        assert_eq!(sla.pause_reason, Some(PauseReason::AwaitingProvider));
    }

    #[test]
    fn resume_while_running_is_noop() {
        let mut sla = case().sla;
        let before = sla.clone();
        assert_eq!(sla.resume(t0()), Transition::Unchanged);
        assert_eq!(sla, before);
    }

    #[test]
    fn zero_length_pause_leaves_total_unchanged() {
        let mut sla = case().sla;
        let at = t0() + TimeDelta::hours(2);
        let _ = sla.pause(PauseReason::AwaitingThirdParty, at);
        let _ = sla.resume(at);
        assert_eq!(sla.total_paused_ms, 0);
    }

    #[test]
    fn resume_before_pause_start_adds_nothing() {
        let mut sla = case().sla;
        let _ = sla.pause(PauseReason::AwaitingProvider, t0() + TimeDelta::hours(2));
        let _ = sla.resume(t0() + TimeDelta::hours(1));
        assert_eq!(sla.total_paused_ms, 0);
        assert!(!sla.is_paused());
    }

    #[test]
    fn pure_helpers_leave_case_untouched() {
        let case = case();
        let paused = pause_sla(&case, PauseReason::AwaitingProvider, t0());
        assert!(paused.is_paused());
        assert!(!case.sla.is_paused());

        let mut paused_case = case.clone();
        paused_case.sla = paused;
        let resumed = resume_sla(&paused_case, t0() + TimeDelta::minutes(30));
        assert_eq!(resumed.total_paused(), TimeDelta::minutes(30));
        assert!(paused_case.sla.is_paused());
    }

    #[test]
    fn resolve_sets_timestamp_once() {
        let mut case = case();
        let first = t0() + TimeDelta::hours(2);
        assert!(resolve(&mut case, first, Some("Packet received".into())).is_applied());
        assert_eq!(case.status, CaseStatus::Resolved);
        assert_eq!(case.resolved_at(), Some(first));

        let again = resolve(&mut case, first + TimeDelta::hours(1), None);
        assert_eq!(again, Transition::Unchanged);
        assert_eq!(case.resolved_at(), Some(first));
    }

    #[test]
    fn resolve_keeps_open_pause() {
        let mut case = case();
        let _ = case.sla.pause(PauseReason::AwaitingProvider, t0());
        let _ = resolve(&mut case, t0() + TimeDelta::hours(1), None);
        assert!(case.sla.is_paused());
        assert_eq!(
            clock_state(&case),
            ClockState::Stopped {
                at: t0() + TimeDelta::hours(1)
            }
        );
    }

    #[test]
    fn closing_unresolved_stops_clock() {
        let mut case = case();
        let _ = case.sla.pause(PauseReason::AwaitingMember, t0());
        case.status = CaseStatus::Closed;
        case.updated_at = t0() + TimeDelta::hours(2);
        assert_eq!(
            clock_state(&case),
            ClockState::Stopped {
                at: t0() + TimeDelta::hours(2)
            }
        );
    }

    #[test]
    fn clock_states() {
        let mut case = case();
        assert_eq!(clock_state(&case), ClockState::Running);
        let _ = case.sla.pause(PauseReason::ScheduledFollowUp, t0());
        assert_eq!(
            clock_state(&case),
            ClockState::Paused {
                since: t0(),
                reason: Some(PauseReason::ScheduledFollowUp)
            }
        );
    }

    #[test]
    fn effective_actions() {
        let paused = ClockState::Paused {
            since: t0(),
            reason: None,
        };
        let stopped = ClockState::Stopped { at: t0() };

        assert!(is_effective(ClockState::Running, ClockAction::Pause));
        assert!(!is_effective(ClockState::Running, ClockAction::Resume));
        assert!(is_effective(paused, ClockAction::Resume));
        assert!(!is_effective(paused, ClockAction::Pause));
        assert!(is_effective(paused, ClockAction::Resolve));
        assert!(!is_effective(stopped, ClockAction::Pause));
        assert!(!is_effective(stopped, ClockAction::Resume));
        assert!(!is_effective(stopped, ClockAction::Resolve));
    }
}

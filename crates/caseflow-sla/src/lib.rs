//! SLA tracking engine for provider-relations cases.
//!
//! The engine is a set of pure functions over a [`Case`] and an explicit
//! `now`. It never reads the wall clock and holds no state of its own; the
//! only durable data is the [`SlaRecord`] stored with each case.
//!
//! - **Policy**: `(category, priority)` to target hours, with a default table
//! - **Due dates**: fixed once at case creation
//! - **Classification**: `on_track`, `at_risk` or `breached`, pause-aware
//! - **Countdowns**: signed remaining time plus display text
//! - **Clock**: pause/resume/resolve transitions on the SLA record
//! - **Analytics**: dashboard counts, compliance reports and trends
//!
//! # Example
//!
//! ```
//! use caseflow_core::{CaseId, CategoryId};
//! use caseflow_sla::{classify, time_remaining, Case, PauseReason, Priority, SlaConfig, SlaState};
//! use chrono::{TimeDelta, Utc};
//!
//! let config = SlaConfig::default();
//! let opened = Utc::now();
//! let mut case = Case::open(
//!     CaseId::generate(),
//!     "Provider missing from directory",
//!     Priority::Urgent,
//!     CategoryId::new("directory").unwrap(),
//!     opened,
//!     &config.policy,
//! );
//!
//! // Urgent cases get four hours by default.
//! assert_eq!(case.sla.due_at, opened + TimeDelta::hours(4));
//!
//! // Paused time does not count against the SLA.
//! let _ = case.sla.pause(PauseReason::AwaitingProvider, opened + TimeDelta::hours(1));
//! let later = opened + TimeDelta::hours(6);
//! assert_eq!(classify(&case, later, &config), SlaState::OnTrack);
//! assert_eq!(time_remaining(&case, later).formatted, "3h 0m");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod analytics;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod policy;
pub mod types;

pub use analytics::{
    compliance_trend, resolution_outcome, resolution_vs_target, urgency_order, ComplianceBucket,
    ComplianceReport, DashboardSummary, GroupBy, Outcome, ResolutionVsTarget, TrendPoint,
};
pub use clock::{
    clock_state, is_effective, pause_sla, resolve, resume_sla, ClockAction, ClockState,
    Transition,
};
pub use config::SlaConfig;
pub use countdown::{format_remaining, time_remaining, TimeRemaining};
pub use engine::{
    classify, effective_due_at, effective_elapsed, live_state, paused_duration, percentage_used,
    remaining, sla_window,
};
pub use error::{Result, SlaError};
pub use policy::{compute_due_date, PolicyTable, PriorityHours, MAX_TARGET_HOURS};
pub use types::{Case, CaseStatus, PauseReason, Priority, Resolution, SlaRecord, SlaState};

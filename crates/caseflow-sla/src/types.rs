//! Case and SLA record types.
//!
//! `Case` is owned by the surrounding case-management system; the `sla`
//! sub-record is the only part this crate mutates, and only through the
//! transitions in [`crate::clock`].

use std::fmt;
use std::str::FromStr;

use caseflow_core::{CaseId, CategoryId, SpecialistId, TeamId};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SlaError;
use crate::policy::{compute_due_date, PolicyTable};

/// Case priority. Drives the SLA target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Patient-impacting or regulatory issue.
    Urgent,
    /// Provider is blocked.
    High,
    /// Standard request.
    Medium,
    /// Informational or low-impact request.
    Low,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Self; 4] = [Self::Urgent, Self::High, Self::Medium, Self::Low];

    /// The wire name of the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = SlaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SlaError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// Workflow status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Newly created, not yet picked up.
    Open,
    /// A specialist is working the case.
    InProgress,
    /// Waiting on the provider to respond.
    PendingProvider,
    /// Resolution recorded.
    Resolved,
    /// Administratively closed.
    Closed,
}

impl CaseStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::InProgress,
        Self::PendingProvider,
        Self::Resolved,
        Self::Closed,
    ];

    /// The wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::PendingProvider => "pending_provider",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Returns true if the SLA clock no longer applies.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = SlaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SlaError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Sanctioned reasons for pausing the SLA clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// Waiting on the provider to supply information or take action.
    AwaitingProvider,
    /// Waiting on the member (patient) to respond.
    AwaitingMember,
    /// Escalated for internal clinical or compliance review.
    AwaitingInternalReview,
    /// Waiting on a payer, clearinghouse or other outside party.
    AwaitingThirdParty,
    /// Follow-up scheduled at the provider's request.
    ScheduledFollowUp,
}

impl PauseReason {
    /// Every reason code.
    pub const ALL: [Self; 5] = [
        Self::AwaitingProvider,
        Self::AwaitingMember,
        Self::AwaitingInternalReview,
        Self::AwaitingThirdParty,
        Self::ScheduledFollowUp,
    ];

    /// The wire name of the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingProvider => "awaiting_provider",
            Self::AwaitingMember => "awaiting_member",
            Self::AwaitingInternalReview => "awaiting_internal_review",
            Self::AwaitingThirdParty => "awaiting_third_party",
            Self::ScheduledFollowUp => "scheduled_follow_up",
        }
    }

    /// Human-readable label for badges and audit text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AwaitingProvider => "Waiting on provider",
            Self::AwaitingMember => "Waiting on member",
            Self::AwaitingInternalReview => "Internal review",
            Self::AwaitingThirdParty => "Waiting on third party",
            Self::ScheduledFollowUp => "Scheduled follow-up",
        }
    }
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PauseReason {
    type Err = SlaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SlaError::UnknownVariant {
                kind: "pause reason",
                value: s.to_string(),
            })
    }
}

/// Compliance state of a live case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaState {
    /// Comfortably inside the SLA window.
    OnTrack,
    /// Inside the risk window before the deadline.
    AtRisk,
    /// The effective deadline has passed.
    Breached,
}

impl SlaState {
    /// The wire name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::AtRisk => "at_risk",
            Self::Breached => "breached",
        }
    }
}

impl fmt::Display for SlaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The SLA sub-record persisted with each case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaRecord {
    /// Deadline fixed at case creation.
    pub due_at: DateTime<Utc>,
    /// When the clock was paused, if it is paused now.
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Why the clock is paused. Set iff `paused_at` is set.
    #[serde(default)]
    pub pause_reason: Option<PauseReason>,
    /// Sum of all closed pause intervals, in milliseconds.
    #[serde(default)]
    pub total_paused_ms: u64,
}

impl SlaRecord {
    /// A running clock with the given deadline.
    #[must_use]
    pub const fn new(due_at: DateTime<Utc>) -> Self {
        Self {
            due_at,
            paused_at: None,
            pause_reason: None,
            total_paused_ms: 0,
        }
    }

    /// Closed pause intervals as a duration, saturating at `TimeDelta::MAX`.
    #[must_use]
    pub fn total_paused(&self) -> TimeDelta {
        i64::try_from(self.total_paused_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Whether a pause interval is currently open.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

/// Resolution details, set exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// When the case was resolved. The SLA clock stops here.
    pub resolved_at: DateTime<Utc>,
    /// Optional free-text resolution summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A provider-relations case, as far as SLA tracking is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Unique identifier.
    pub id: CaseId,
    /// Short description shown in lists.
    pub title: String,
    /// Current priority. Editing it does not move `sla.due_at`.
    pub priority: Priority,
    /// Category used for the policy lookup at creation.
    pub category: CategoryId,
    /// Optional finer classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Workflow status.
    pub status: CaseStatus,
    /// Owning team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    /// Assigned specialist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<SpecialistId>,
    /// SLA clock state.
    pub sla: SlaRecord,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Present once the case has been resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl Case {
    /// Open a new case, fixing its SLA deadline from `policy`.
    #[must_use]
    pub fn open(
        id: CaseId,
        title: impl Into<String>,
        priority: Priority,
        category: CategoryId,
        created_at: DateTime<Utc>,
        policy: &PolicyTable,
    ) -> Self {
        let due_at = compute_due_date(created_at, priority, &category, policy);
        Self {
            id,
            title: title.into(),
            priority,
            category,
            subcategory: None,
            status: CaseStatus::Open,
            team_id: None,
            assignee_id: None,
            sla: SlaRecord::new(due_at),
            created_at,
            updated_at: created_at,
            resolution: None,
        }
    }

    /// Returns true if no SLA state should be computed or shown.
    #[must_use]
    pub const fn is_sla_exempt(&self) -> bool {
        self.status.is_terminal() || self.resolution.is_some()
    }

    /// When the case was resolved, if it was.
    #[must_use]
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolution.as_ref().map(|r| r.resolved_at)
    }

    /// The instant the clock stopped for good.
    ///
    /// That is the resolution time, or for a case closed without one, its
    /// last update. Closed cases accept no further changes, so `updated_at`
    /// stays at the close time.
    #[must_use]
    pub fn clock_stopped_at(&self) -> Option<DateTime<Utc>> {
        match self.resolved_at() {
            Some(at) => Some(at),
            None if self.status.is_terminal() => Some(self.updated_at),
            None => None,
        }
    }
}

//! Request and response types for desk operations.

use caseflow_core::{CaseId, CategoryId, SpecialistId, TeamId};
use caseflow_sla::{
    clock_state, effective_due_at, live_state, percentage_used, time_remaining, Case, CaseStatus,
    ClockState, PauseReason, Priority, SlaConfig, SlaState, TimeRemaining,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to open a new case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaseRequest {
    /// Short description shown in lists.
    pub title: String,
    /// Initial priority; selects the SLA target.
    pub priority: Priority,
    /// Category used for the policy lookup.
    pub category: CategoryId,
    /// Optional finer classification.
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Owning team.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    /// Assigned specialist.
    #[serde(default)]
    pub assignee_id: Option<SpecialistId>,
}

impl CreateCaseRequest {
    /// Create a request with no subcategory or assignment.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: Priority, category: CategoryId) -> Self {
        Self {
            title: title.into(),
            priority,
            category,
            subcategory: None,
            team_id: None,
            assignee_id: None,
        }
    }

    /// Set the subcategory.
    #[must_use]
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Assign the case to a team.
    #[must_use]
    pub const fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Assign the case to a specialist.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: SpecialistId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }
}

/// Point-in-time SLA view of one case, as shown on case lists and badges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaSnapshot {
    /// The case.
    pub case_id: CaseId,
    /// Case title.
    pub title: String,
    /// Current priority.
    pub priority: Priority,
    /// Workflow status.
    pub status: CaseStatus,
    /// Compliance state, or `None` for resolved and closed cases.
    pub state: Option<SlaState>,
    /// Reason for the open pause, if the clock is paused.
    pub paused_for: Option<PauseReason>,
    /// Deadline fixed at creation.
    pub due_at: DateTime<Utc>,
    /// Deadline including all paused time.
    pub effective_due_at: DateTime<Utc>,
    /// Countdown figures.
    pub remaining: TimeRemaining,
    /// Share of the SLA window consumed. Above 100 once breached.
    pub percentage_used: f64,
}

impl SlaSnapshot {
    /// Evaluate `case` at `now`.
    #[must_use]
    pub fn of(case: &Case, now: DateTime<Utc>, config: &SlaConfig) -> Self {
        let paused_for = match clock_state(case) {
            ClockState::Paused { reason, .. } => reason,
            ClockState::Running | ClockState::Stopped { .. } => None,
        };
        Self {
            case_id: case.id,
            title: case.title.clone(),
            priority: case.priority,
            status: case.status,
            state: live_state(case, now, config),
            paused_for,
            due_at: case.sla.due_at,
            effective_due_at: effective_due_at(case, now),
            remaining: time_remaining(case, now),
            percentage_used: percentage_used(case, now),
        }
    }

    /// Returns true if the case is exempt from SLA tracking.
    #[must_use]
    pub const fn is_exempt(&self) -> bool {
        self.state.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_sla::PolicyTable;
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-06T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn request_builder() {
        let team = TeamId::generate();
        let request = CreateCaseRequest::new(
            "Roster update",
            Priority::Low,
            CategoryId::new("directory").unwrap(),
        )
        .with_subcategory("roster")
        .with_team(team);

        assert_eq!(request.subcategory.as_deref(), Some("roster"));
        assert_eq!(request.team_id, Some(team));
        assert!(request.assignee_id.is_none());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: CreateCaseRequest = serde_json::from_str(
            r#"{"title": "Fee dispute", "priority": "high", "category": "contracting"}"#,
        )
        .unwrap();
        assert_eq!(request.priority, Priority::High);
        assert_eq!(request.category.as_str(), "contracting");
        assert!(request.team_id.is_none());
    }

    #[test]
    fn snapshot_of_paused_case() {
        let mut case = Case::open(
            CaseId::generate(),
            "Missing W-9",
            Priority::Urgent,
            CategoryId::new("credentialing").unwrap(),
            t0(),
            &PolicyTable::default(),
        );
        let paused_at = t0() + TimeDelta::hours(1);
        let _ = case.sla.pause(PauseReason::AwaitingProvider, paused_at);

        let snapshot = SlaSnapshot::of(&case, t0() + TimeDelta::hours(3), &SlaConfig::default());
        assert_eq!(snapshot.state, Some(SlaState::OnTrack));
        assert_eq!(snapshot.paused_for, Some(PauseReason::AwaitingProvider));
        assert_eq!(snapshot.effective_due_at, t0() + TimeDelta::hours(6));
        assert!(snapshot.remaining.is_paused);
        assert!(!snapshot.is_exempt());
    }
}

//! Case desk service implementation.
//!
//! This module provides the `Desk` trait and the `CaseDesk` implementation
//! that applies operator actions to cases and answers dashboard queries.

use std::sync::Arc;

use caseflow_core::{CaseId, CategoryId};
use caseflow_sla::{
    clock, compliance_trend, live_state, urgency_order, Case, CaseStatus, ComplianceReport,
    DashboardSummary, GroupBy, PauseReason, Priority, SlaConfig, SlaState, Transition, TrendPoint,
};
use caseflow_store::Store;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{DeskError, Result};
use crate::types::{CreateCaseRequest, SlaSnapshot};

/// Trait defining the case desk operations.
///
/// Every method that mutates a case takes the action time explicitly.
pub trait Desk: Send + Sync {
    // =========================================================================
    // Case Operations
    // =========================================================================

    /// Open a new case and fix its due date.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Store` if the case cannot be stored.
    fn open_case(&self, request: CreateCaseRequest, now: DateTime<Utc>) -> Result<Case>;

    /// Get a case by ID.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseNotFound` if the case doesn't exist.
    fn get_case(&self, case_id: &CaseId) -> Result<Case>;

    /// List all cases, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Store` if the store fails.
    fn list_cases(&self) -> Result<Vec<Case>>;

    /// Change the priority. The due date is not recomputed.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseClosed` if the case is resolved or closed.
    fn reprioritize(
        &self,
        case_id: &CaseId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Result<Case>;

    /// Change the category. The due date is not recomputed.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseClosed` if the case is resolved or closed.
    fn recategorize(
        &self,
        case_id: &CaseId,
        category: CategoryId,
        now: DateTime<Utc>,
    ) -> Result<Case>;

    /// Move a live case between non-terminal statuses.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::InvalidStatus` for `resolved` or `closed`, and
    /// `DeskError::CaseClosed` if the case is already exempt.
    fn set_status(
        &self,
        case_id: &CaseId,
        status: CaseStatus,
        now: DateTime<Utc>,
    ) -> Result<Case>;

    // =========================================================================
    // SLA Clock Operations
    // =========================================================================

    /// Pause the SLA clock. Pausing a paused clock is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::PauseReasonNotAllowed` if the reason is disabled,
    /// or `DeskError::CaseClosed` if the case is resolved or closed.
    fn pause_case(
        &self,
        case_id: &CaseId,
        reason: PauseReason,
        now: DateTime<Utc>,
    ) -> Result<(Case, Transition)>;

    /// Resume the SLA clock. Resuming a running clock is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseClosed` if the case is resolved or closed.
    fn resume_case(&self, case_id: &CaseId, now: DateTime<Utc>) -> Result<(Case, Transition)>;

    /// Resolve the case, stopping its clock for good.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseClosed` if the case was closed unresolved.
    fn resolve_case(
        &self,
        case_id: &CaseId,
        summary: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Case, Transition)>;

    /// Close the case. Closed cases are exempt from every SLA figure.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseNotFound` if the case doesn't exist.
    fn close_case(&self, case_id: &CaseId, now: DateTime<Utc>) -> Result<(Case, Transition)>;

    // =========================================================================
    // Views
    // =========================================================================

    /// SLA view of one case at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::CaseNotFound` if the case doesn't exist.
    fn sla_status(&self, case_id: &CaseId, now: DateTime<Utc>) -> Result<SlaSnapshot>;

    /// Dashboard counts at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Store` if the store fails.
    fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSummary>;

    /// Compliance of resolved cases grouped by `group_by`.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Store` if the store fails.
    fn compliance_report(&self, group_by: GroupBy) -> Result<ComplianceReport>;

    /// Daily compliance between two dates, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Store` if the store fails.
    fn compliance_trend(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<TrendPoint>>;

    /// Live cases that are at risk or already breached, most urgent first.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Store` if the store fails.
    fn at_risk_cases(&self, now: DateTime<Utc>) -> Result<Vec<SlaSnapshot>>;
}

/// The main case desk implementation.
pub struct CaseDesk<S: Store> {
    store: Arc<S>,
    config: SlaConfig,
}

impl<S: Store> CaseDesk<S> {
    /// Create a new desk after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Config` if the configuration is invalid.
    pub fn new(store: Arc<S>, config: SlaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self {
            store,
            config: SlaConfig::default(),
        }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SlaConfig {
        &self.config
    }

    /// Apply `f` to a live case under the store's write lock.
    fn update_live<T, F>(&self, case_id: &CaseId, f: F) -> Result<(Case, T)>
    where
        F: FnOnce(&mut Case) -> Result<T>,
    {
        self.store.update_case(case_id, |case| {
            ensure_live(case)?;
            f(case)
        })
    }
}

fn ensure_live(case: &Case) -> Result<()> {
    if case.is_sla_exempt() {
        return Err(DeskError::CaseClosed {
            case_id: case.id,
            status: case.status,
        });
    }
    Ok(())
}

impl<S: Store> Desk for CaseDesk<S> {
    // =========================================================================
    // Case Operations
    // =========================================================================

    fn open_case(&self, request: CreateCaseRequest, now: DateTime<Utc>) -> Result<Case> {
        let policy = &self.config.policy;
        let default_policy = !policy.has_category(&request.category);
        let target_hours = policy.target_hours(&request.category, request.priority);

        let mut case = Case::open(
            CaseId::generate(),
            request.title,
            request.priority,
            request.category,
            now,
            policy,
        );
        case.subcategory = request.subcategory;
        case.team_id = request.team_id;
        case.assignee_id = request.assignee_id;

        self.store.put_case(&case)?;

        tracing::info!(
            case_id = %case.id,
            priority = %case.priority,
            category = %case.category,
            target_hours,
            default_policy,
            due_at = %case.sla.due_at,
            "Opened case"
        );

        Ok(case)
    }

    fn get_case(&self, case_id: &CaseId) -> Result<Case> {
        self.store
            .get_case(case_id)?
            .ok_or(DeskError::CaseNotFound(*case_id))
    }

    fn list_cases(&self) -> Result<Vec<Case>> {
        Ok(self.store.list_cases()?)
    }

    fn reprioritize(
        &self,
        case_id: &CaseId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Result<Case> {
        let (case, previous) = self.update_live(case_id, |case| {
            let previous = case.priority;
            case.priority = priority;
            case.updated_at = now;
            Ok(previous)
        })?;

        tracing::info!(
            case_id = %case_id,
            from = %previous,
            to = %priority,
            due_at = %case.sla.due_at,
            "Reprioritized case; due date unchanged"
        );

        Ok(case)
    }

    fn recategorize(
        &self,
        case_id: &CaseId,
        category: CategoryId,
        now: DateTime<Utc>,
    ) -> Result<Case> {
        let (case, previous) = self.update_live(case_id, |case| {
            let previous = std::mem::replace(&mut case.category, category);
            case.updated_at = now;
            Ok(previous)
        })?;

        tracing::info!(
            case_id = %case_id,
            from = %previous,
            to = %case.category,
            due_at = %case.sla.due_at,
            "Recategorized case; due date unchanged"
        );

        Ok(case)
    }

    fn set_status(
        &self,
        case_id: &CaseId,
        status: CaseStatus,
        now: DateTime<Utc>,
    ) -> Result<Case> {
        if status.is_terminal() {
            return Err(DeskError::InvalidStatus {
                case_id: *case_id,
                status,
            });
        }

        let (case, ()) = self.update_live(case_id, |case| {
            case.status = status;
            case.updated_at = now;
            Ok(())
        })?;

        tracing::info!(case_id = %case_id, status = %status, "Updated case status");

        Ok(case)
    }

    // =========================================================================
    // SLA Clock Operations
    // =========================================================================

    fn pause_case(
        &self,
        case_id: &CaseId,
        reason: PauseReason,
        now: DateTime<Utc>,
    ) -> Result<(Case, Transition)> {
        if !self.config.allows_pause_reason(reason) {
            return Err(DeskError::PauseReasonNotAllowed(reason));
        }

        let (case, transition) = self.update_live(case_id, |case| {
            let transition = case.sla.pause(reason, now);
            if transition.is_applied() {
                case.updated_at = now;
            }
            Ok(transition)
        })?;

        if transition.is_applied() {
            tracing::info!(case_id = %case_id, reason = %reason, "Paused SLA clock");
        } else {
            tracing::debug!(case_id = %case_id, "SLA clock already paused");
        }

        Ok((case, transition))
    }

    fn resume_case(&self, case_id: &CaseId, now: DateTime<Utc>) -> Result<(Case, Transition)> {
        let (case, transition) = self.update_live(case_id, |case| {
            let transition = case.sla.resume(now);
            if transition.is_applied() {
                case.updated_at = now;
            }
            Ok(transition)
        })?;

        if transition.is_applied() {
            tracing::info!(
                case_id = %case_id,
                total_paused_ms = case.sla.total_paused_ms,
                "Resumed SLA clock"
            );
        } else {
            tracing::debug!(case_id = %case_id, "SLA clock already running");
        }

        Ok((case, transition))
    }

    fn resolve_case(
        &self,
        case_id: &CaseId,
        summary: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Case, Transition)> {
        let (case, transition) = self.store.update_case(case_id, |case| {
            if case.status == CaseStatus::Closed && case.resolution.is_none() {
                return Err(DeskError::CaseClosed {
                    case_id: case.id,
                    status: case.status,
                });
            }
            Ok(clock::resolve(case, now, summary))
        })?;

        if transition.is_applied() {
            tracing::info!(
                case_id = %case_id,
                outcome = ?caseflow_sla::resolution_outcome(&case),
                "Resolved case"
            );
        }

        Ok((case, transition))
    }

    fn close_case(&self, case_id: &CaseId, now: DateTime<Utc>) -> Result<(Case, Transition)> {
        let (case, transition) = self.store.update_case(case_id, |case| {
            if case.status == CaseStatus::Closed {
                return Ok::<_, DeskError>(Transition::Unchanged);
            }
            case.status = CaseStatus::Closed;
            case.updated_at = now;
            Ok(Transition::Applied)
        })?;

        if transition.is_applied() {
            tracing::info!(
                case_id = %case_id,
                resolved = case.resolution.is_some(),
                "Closed case"
            );
        }

        Ok((case, transition))
    }

    // =========================================================================
    // Views
    // =========================================================================

    fn sla_status(&self, case_id: &CaseId, now: DateTime<Utc>) -> Result<SlaSnapshot> {
        let case = self.get_case(case_id)?;
        Ok(SlaSnapshot::of(&case, now, &self.config))
    }

    fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let cases = self.store.list_cases()?;
        Ok(DashboardSummary::compute(&cases, now, &self.config))
    }

    fn compliance_report(&self, group_by: GroupBy) -> Result<ComplianceReport> {
        let cases = self.store.list_cases()?;
        Ok(ComplianceReport::compute(&cases, group_by))
    }

    fn compliance_trend(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<TrendPoint>> {
        let cases = self.store.list_cases()?;
        Ok(compliance_trend(&cases, from, to))
    }

    fn at_risk_cases(&self, now: DateTime<Utc>) -> Result<Vec<SlaSnapshot>> {
        let cases = self.store.list_cases()?;
        Ok(urgency_order(&cases, now)
            .into_iter()
            .filter(|case| {
                matches!(
                    live_state(case, now, &self.config),
                    Some(SlaState::AtRisk | SlaState::Breached)
                )
            })
            .map(|case| SlaSnapshot::of(case, now, &self.config))
            .collect())
    }
}

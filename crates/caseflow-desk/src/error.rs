//! Error types for the case desk.
//!
//! This module defines all errors that can occur while acting on cases.

use caseflow_core::CaseId;
use caseflow_sla::{CaseStatus, PauseReason, SlaError};
use caseflow_store::StoreError;
use thiserror::Error;

/// A result type using `DeskError`.
pub type Result<T> = std::result::Result<T, DeskError>;

/// Errors that can occur in desk operations.
#[derive(Debug, Error)]
pub enum DeskError {
    /// The requested case was not found.
    #[error("case not found: {0}")]
    CaseNotFound(CaseId),

    /// The case is resolved or closed and no longer accepts the action.
    #[error("case {case_id} is {status}; its SLA clock is stopped")]
    CaseClosed {
        /// The case being acted on.
        case_id: CaseId,
        /// Its current status.
        status: CaseStatus,
    },

    /// The pause reason is not in the configured allow-list.
    #[error("pause reason {0} is not allowed")]
    PauseReasonNotAllowed(PauseReason),

    /// The status cannot be set directly.
    #[error("cannot set case {case_id} to {status}; use resolve or close")]
    InvalidStatus {
        /// The case being acted on.
        case_id: CaseId,
        /// The requested status.
        status: CaseStatus,
    },

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// Invalid SLA configuration.
    #[error("configuration error: {0}")]
    Config(#[from] SlaError),
}

impl From<StoreError> for DeskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(case_id) => Self::CaseNotFound(case_id),
            other => Self::Store(other),
        }
    }
}

impl DeskError {
    /// Returns true if the caller can fix this error by changing the request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

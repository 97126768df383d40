//! Error types for the case store.

use caseflow_core::CaseId;
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The requested case was not found.
    #[error("case not found: {0}")]
    NotFound(CaseId),

    /// A case with this id is already stored.
    #[error("case already exists: {0}")]
    AlreadyExists(CaseId),
}

//! Case storage for caseflow.
//!
//! Persistent storage belongs to the surrounding application; this crate
//! defines the narrow interface the SLA desk needs and ships an in-memory
//! implementation used by the command-line tool and the tests.
//!
//! # Example
//!
//! ```
//! use caseflow_core::{CaseId, CategoryId};
//! use caseflow_sla::{Case, PolicyTable, Priority};
//! use caseflow_store::{MemoryStore, Store};
//! use chrono::Utc;
//!
//! let store = MemoryStore::new();
//! let case = Case::open(
//!     CaseId::generate(),
//!     "Update practice address",
//!     Priority::Medium,
//!     CategoryId::new("directory").unwrap(),
//!     Utc::now(),
//!     &PolicyTable::default(),
//! );
//! store.put_case(&case).unwrap();
//!
//! assert_eq!(store.get_case(&case.id).unwrap(), Some(case));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use caseflow_core::CaseId;
use caseflow_sla::{Case, CaseStatus};

/// The storage trait defining all case operations.
///
/// Implementations must serialize [`Store::update_case`] calls for the same
/// case so that SLA transitions never race.
pub trait Store: Send + Sync {
    /// Insert a new case.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the id is taken.
    fn put_case(&self, case: &Case) -> Result<()>;

    /// Get a case by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn get_case(&self, case_id: &CaseId) -> Result<Option<Case>>;

    /// Delete a case by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the case doesn't exist.
    fn delete_case(&self, case_id: &CaseId) -> Result<()>;

    /// List every case, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn list_cases(&self) -> Result<Vec<Case>>;

    /// List cases with the given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn list_cases_by_status(&self, status: CaseStatus) -> Result<Vec<Case>>;

    /// Atomically read, modify and write back one case.
    ///
    /// `f` runs on a copy while the case is locked against other writers.
    /// The copy is stored only if `f` returns `Ok`; on `Err` the stored case
    /// is untouched. Returns the stored case and `f`'s value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` (converted into `E`) if the case
    /// doesn't exist, or whatever error `f` returns.
    fn update_case<T, E, F>(&self, case_id: &CaseId, f: F) -> std::result::Result<(Case, T), E>
    where
        F: FnOnce(&mut Case) -> std::result::Result<T, E>,
        E: From<StoreError>;
}

//! Case desk for caseflow SLA tracking.
//!
//! This crate provides the operator-facing actions on provider-relations
//! cases. It is the only writer of SLA records: every clock transition goes
//! through [`Store::update_case`], so concurrent actions on one case are
//! serialized.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  caseflow CLI / dashboards                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          CaseDesk                           │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Case      │ │  SLA clock  │ │   Dashboard and     │    │
//! │  │   actions   │ │  pause/res. │ │   compliance views  │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼                              ▼
//!        ┌──────────────┐              ┌────────────────┐
//!        │    Store     │              │  caseflow-sla  │
//!        │ (in-memory)  │              │  (pure engine) │
//!        └──────────────┘              └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use caseflow_desk::{CaseDesk, CreateCaseRequest, Desk};
//! use caseflow_core::CategoryId;
//! use caseflow_sla::{PauseReason, Priority};
//! use caseflow_store::MemoryStore;
//! use chrono::Utc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let desk = CaseDesk::with_defaults(Arc::new(MemoryStore::new()));
//! let now = Utc::now();
//!
//! let request = CreateCaseRequest::new(
//!     "Claims denied after address change",
//!     Priority::High,
//!     CategoryId::new("claims")?,
//! );
//! let case = desk.open_case(request, now)?;
//! let (case, _) = desk.pause_case(&case.id, PauseReason::AwaitingProvider, now)?;
//! assert!(case.sla.is_paused());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Case actions
//!
//! - Open: fixes the due date from the policy table
//! - Pause / resume: duplicate triggers are no-ops
//! - Resolve: stops the clock at the resolution time
//! - Close: stops the clock and exempts the case from every SLA figure
//! - Reprioritize / recategorize: the due date stays where it was

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod service;
pub mod types;

pub use error::{DeskError, Result};
pub use service::{CaseDesk, Desk};
pub use types::{CreateCaseRequest, SlaSnapshot};

// Re-export commonly used types from dependencies for convenience
pub use caseflow_core::{CaseId, CategoryId, SpecialistId, TeamId};
pub use caseflow_sla::{Case, CaseStatus, PauseReason, Priority, SlaConfig, SlaState, Transition};

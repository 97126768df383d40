//! Core types for caseflow.
//!
//! This crate provides the strongly-typed identifiers shared by every other
//! caseflow crate: cases, teams, specialists and categories.
//!
//! # Example
//!
//! ```
//! use caseflow_core::{CaseId, CategoryId};
//!
//! let case_id = CaseId::generate();
//! let category = CategoryId::new("credentialing").unwrap();
//!
//! assert_eq!(category.as_str(), "credentialing");
//! assert_eq!(case_id.to_string().parse::<CaseId>().unwrap(), case_id);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{CaseId, CategoryId, IdError, SpecialistId, TeamId};

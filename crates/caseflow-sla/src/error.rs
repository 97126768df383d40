//! Error types for the SLA engine.
//!
//! The engine's computations never fail. Errors only arise when parsing
//! enumerated values or loading an invalid configuration.

use caseflow_core::CategoryId;
use thiserror::Error;

use crate::types::Priority;

/// A result type using `SlaError`.
pub type Result<T> = std::result::Result<T, SlaError>;

/// Errors raised while parsing or validating SLA configuration.
#[derive(Debug, Error)]
pub enum SlaError {
    /// A string did not name a known enum variant.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// Which enumeration was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A policy table entry has a zero-hour target.
    #[error("SLA target for {priority} in {} must be at least one hour", .category.as_ref().map_or("the default table", CategoryId::as_str))]
    InvalidTargetHours {
        /// The category, or `None` for the default table.
        category: Option<CategoryId>,
        /// The offending priority.
        priority: Priority,
    },

    /// A policy table entry is longer than the engine can schedule.
    #[error("SLA target for {priority} in {} is {hours} hours, the limit is {max}", .category.as_ref().map_or("the default table", CategoryId::as_str))]
    TargetHoursTooLarge {
        /// The category, or `None` for the default table.
        category: Option<CategoryId>,
        /// The offending priority.
        priority: Priority,
        /// The configured target.
        hours: u32,
        /// The largest accepted target.
        max: u32,
    },

    /// The risk window is not a percentage.
    #[error("risk window must be between 0 and 100 percent, got {0}")]
    InvalidRiskWindow(u8),

    /// No pause reasons are enabled.
    #[error("at least one pause reason must be allowed")]
    NoPauseReasons,

    /// The configuration document could not be parsed.
    #[error("invalid SLA configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

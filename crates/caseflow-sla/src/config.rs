//! SLA engine configuration.
//!
//! Loaded from JSON by the command-line front end. Every field has a
//! default, so an empty document `{}` is a valid configuration.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlaError};
use crate::policy::PolicyTable;
use crate::types::PauseReason;

/// Configuration for classification, dashboards and pause handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaConfig {
    /// A live case is `at_risk` once remaining time is at or below this
    /// percentage of its SLA window.
    #[serde(default = "SlaConfig::default_risk_window_percent")]
    pub risk_window_percent: u8,

    /// Dashboard "due soon" horizon in hours.
    #[serde(default = "SlaConfig::default_due_soon_hours")]
    pub due_soon_hours: u32,

    /// How often countdown displays re-render, in seconds.
    #[serde(default = "SlaConfig::default_countdown_refresh")]
    pub countdown_refresh_seconds: u64,

    /// Pause reasons an operator may choose. Admin-managed.
    #[serde(default = "SlaConfig::default_pause_reasons")]
    pub allowed_pause_reasons: Vec<PauseReason>,

    /// Target-hours policy applied to new cases.
    #[serde(default)]
    pub policy: PolicyTable,
}

impl SlaConfig {
    const fn default_risk_window_percent() -> u8 {
        25
    }

    const fn default_due_soon_hours() -> u32 {
        24
    }

    const fn default_countdown_refresh() -> u64 {
        60
    }

    fn default_pause_reasons() -> Vec<PauseReason> {
        PauseReason::ALL.to_vec()
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `SlaError::Parse` for malformed JSON, or the first validation
    /// error found.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the engine cannot use.
    ///
    /// # Errors
    ///
    /// Returns an error if the risk window exceeds 100%, no pause reason is
    /// allowed, or a policy target is outside the accepted range.
    pub fn validate(&self) -> Result<()> {
        if self.risk_window_percent > 100 {
            return Err(SlaError::InvalidRiskWindow(self.risk_window_percent));
        }
        if self.allowed_pause_reasons.is_empty() {
            return Err(SlaError::NoPauseReasons);
        }
        self.policy.validate()
    }

    /// Returns true if operators may pause with this reason.
    #[must_use]
    pub fn allows_pause_reason(&self, reason: PauseReason) -> bool {
        self.allowed_pause_reasons.contains(&reason)
    }

    /// The "due soon" horizon as a duration.
    #[must_use]
    pub fn due_soon(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.due_soon_hours))
    }

    /// The countdown refresh interval.
    #[must_use]
    pub fn countdown_refresh(&self) -> Duration {
        Duration::from_secs(self.countdown_refresh_seconds.max(1))
    }
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            risk_window_percent: Self::default_risk_window_percent(),
            due_soon_hours: Self::default_due_soon_hours(),
            countdown_refresh_seconds: Self::default_countdown_refresh(),
            allowed_pause_reasons: Self::default_pause_reasons(),
            policy: PolicyTable::default(),
        }
    }
}

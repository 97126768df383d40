//! SLA policy lookup and due-date calculation.
//!
//! A [`PolicyTable`] maps `(category, priority)` to target resolution hours.
//! Categories missing from the table fall back to the priority-only default
//! table, so case intake is never blocked by missing configuration.
//!
//! Tables are plain values passed to the engine. Several versions can exist
//! side by side, which lets analytics replay historical cases against the
//! policy that was in force when they were opened.

use std::collections::BTreeMap;

use caseflow_core::CategoryId;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlaError};
use crate::types::Priority;

/// Longest accepted target, ten years of calendar hours.
pub const MAX_TARGET_HOURS: u32 = 87_600;

/// Target resolution hours for each priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityHours {
    /// Hours allowed for urgent cases.
    pub urgent: u32,
    /// Hours allowed for high-priority cases.
    pub high: u32,
    /// Hours allowed for medium-priority cases.
    pub medium: u32,
    /// Hours allowed for low-priority cases.
    pub low: u32,
}

impl PriorityHours {
    /// Hours allowed for `priority`.
    #[must_use]
    pub const fn get(&self, priority: Priority) -> u32 {
        match priority {
            Priority::Urgent => self.urgent,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    fn validate(&self, category: Option<&CategoryId>) -> Result<()> {
        for priority in Priority::ALL {
            let hours = self.get(priority);
            if hours == 0 {
                return Err(SlaError::InvalidTargetHours {
                    category: category.cloned(),
                    priority,
                });
            }
            if hours > MAX_TARGET_HOURS {
                return Err(SlaError::TargetHoursTooLarge {
                    category: category.cloned(),
                    priority,
                    hours,
                    max: MAX_TARGET_HOURS,
                });
            }
        }
        Ok(())
    }
}

impl Default for PriorityHours {
    fn default() -> Self {
        Self {
            urgent: 4,
            high: 24,
            medium: 72,  // 3 days
            low: 168,    // 1 week
        }
    }
}

/// Category-specific SLA targets plus a default table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    /// Policy revision. Changes apply to new cases only.
    #[serde(default = "PolicyTable::default_version")]
    pub version: u32,

    /// Targets for categories that have no entry of their own.
    #[serde(default)]
    pub default: PriorityHours,

    /// Per-category targets.
    #[serde(default)]
    pub categories: BTreeMap<CategoryId, PriorityHours>,
}

impl PolicyTable {
    const fn default_version() -> u32 {
        1
    }

    /// A table with only the built-in default targets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the targets for a category.
    #[must_use]
    pub fn with_category(mut self, category: CategoryId, hours: PriorityHours) -> Self {
        self.categories.insert(category, hours);
        self
    }

    /// Returns true if the category has its own targets.
    #[must_use]
    pub fn has_category(&self, category: &CategoryId) -> bool {
        self.categories.contains_key(category)
    }

    /// Target resolution hours for a case of this category and priority.
    #[must_use]
    pub fn target_hours(&self, category: &CategoryId, priority: Priority) -> u32 {
        self.categories
            .get(category)
            .unwrap_or(&self.default)
            .get(priority)
    }

    /// Target resolution time as a duration.
    #[must_use]
    pub fn target(&self, category: &CategoryId, priority: Priority) -> TimeDelta {
        TimeDelta::hours(i64::from(self.target_hours(category, priority)))
    }

    /// Check that every target is between one hour and [`MAX_TARGET_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns `SlaError::InvalidTargetHours` for the first zero-hour entry
    /// and `SlaError::TargetHoursTooLarge` for one past the limit.
    pub fn validate(&self) -> Result<()> {
        self.default.validate(None)?;
        for (category, hours) in &self.categories {
            hours.validate(Some(category))?;
        }
        Ok(())
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            default: PriorityHours::default(),
            categories: BTreeMap::new(),
        }
    }
}

/// Compute the SLA deadline for a case opened at `created_at`.
///
/// Uses continuous calendar hours; there is no business-hours adjustment.
/// A deadline past the calendar's range saturates to its last instant.
#[must_use]
pub fn compute_due_date(
    created_at: DateTime<Utc>,
    priority: Priority,
    category: &CategoryId,
    policy: &PolicyTable,
) -> DateTime<Utc> {
    created_at
        .checked_add_signed(policy.target(category, priority))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentialing() -> CategoryId {
        CategoryId::new("credentialing").unwrap()
    }

    fn table() -> PolicyTable {
        PolicyTable::new().with_category(
            credentialing(),
            PriorityHours {
                urgent: 8,
                high: 48,
                medium: 120,
                low: 240,
            },
        )
    }

    #[test]
    fn category_targets_win() {
        let policy = table();
        assert_eq!(policy.target_hours(&credentialing(), Priority::Urgent), 8);
        assert_eq!(policy.target_hours(&credentialing(), Priority::Low), 240);
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        let policy = table();
        let claims = CategoryId::new("claims").unwrap();
        assert!(!policy.has_category(&claims));
        assert_eq!(policy.target_hours(&claims, Priority::Urgent), 4);
        assert_eq!(policy.target_hours(&claims, Priority::High), 24);
        assert_eq!(policy.target_hours(&claims, Priority::Medium), 72);
        assert_eq!(policy.target_hours(&claims, Priority::Low), 168);
    }

    #[test]
    fn due_date_adds_continuous_hours() {
        let created = DateTime::parse_from_rfc3339("2024-03-01T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let due = compute_due_date(created, Priority::Urgent, &credentialing(), &table());
        assert_eq!(due.to_rfc3339(), "2024-03-02T06:30:00+00:00");
    }

    #[test]
    fn validate_rejects_zero_hours() {
        let mut policy = table();
        assert!(policy.validate().is_ok());

        policy.categories.insert(
            CategoryId::new("claims").unwrap(),
            PriorityHours {
                urgent: 0,
                ..PriorityHours::default()
            },
        );
        match policy.validate() {
            Err(SlaError::InvalidTargetHours { category, priority }) => {
                assert_eq!(category.unwrap().as_str(), "claims");
                assert_eq!(priority, Priority::Urgent);
            }
            other => panic!("expected InvalidTargetHours, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_targets_past_limit() {
        let mut policy = table();
        policy.default.low = MAX_TARGET_HOURS;
        assert!(policy.validate().is_ok());

        policy.default.high = 4_000_000_000;
        match policy.validate() {
            Err(SlaError::TargetHoursTooLarge {
                category,
                priority,
                hours,
                ..
            }) => {
                assert!(category.is_none());
                assert_eq!(priority, Priority::High);
                assert_eq!(hours, 4_000_000_000);
            }
            other => panic!("expected TargetHoursTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn unchecked_huge_target_saturates() {
        let mut policy = table();
        policy.default.urgent = u32::MAX;
        let claims = CategoryId::new("claims").unwrap();
        let created = DateTime::parse_from_rfc3339("2024-03-01T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let due = compute_due_date(created, Priority::Urgent, &claims, &policy);
        assert_eq!(due, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"categories":{"contracting":{"urgent":2,"high":12,"medium":48,"low":96}}}"#;
        let policy: PolicyTable = serde_json::from_str(json).unwrap();
        assert_eq!(policy.version, 1);
        assert_eq!(policy.default, PriorityHours::default());
        let contracting = CategoryId::new("contracting").unwrap();
        assert_eq!(policy.target_hours(&contracting, Priority::Urgent), 2);
    }
}

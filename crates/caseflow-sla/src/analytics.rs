//! Dashboard and compliance analytics.
//!
//! Nothing here is cached or persisted. Every figure is re-derived from case
//! snapshots and the engine functions, so live dashboards and historical
//! replays share one code path.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlaConfig;
use crate::engine::{effective_elapsed, live_state, remaining, sla_window};
use crate::error::SlaError;
use crate::types::{Case, Priority, SlaState};

/// Headline counts for the home dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Live (non-exempt) cases.
    pub open: u32,
    /// Live cases on track.
    pub on_track: u32,
    /// Live cases inside the risk window.
    pub at_risk: u32,
    /// Live cases past their effective deadline.
    pub breached: u32,
    /// Live cases with the clock paused.
    pub paused: u32,
    /// Running, not overdue, and due within the configured horizon.
    pub due_soon: u32,
    /// Resolved or closed cases, excluded from every other count.
    pub exempt: u32,
}

impl DashboardSummary {
    /// Tally `cases` at `now`.
    #[must_use]
    pub fn compute<'a, I>(cases: I, now: DateTime<Utc>, config: &SlaConfig) -> Self
    where
        I: IntoIterator<Item = &'a Case>,
    {
        let due_soon = config.due_soon();
        let mut summary = Self::default();
        for case in cases {
            let Some(state) = live_state(case, now, config) else {
                summary.exempt += 1;
                continue;
            };
            summary.open += 1;
            match state {
                SlaState::OnTrack => summary.on_track += 1,
                SlaState::AtRisk => summary.at_risk += 1,
                SlaState::Breached => summary.breached += 1,
            }
            if case.sla.is_paused() {
                summary.paused += 1;
            } else {
                let left = remaining(case, now);
                if left > TimeDelta::zero() && left <= due_soon {
                    summary.due_soon += 1;
                }
            }
        }
        summary
    }
}

/// Whether a resolved case met its SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Resolved before the effective deadline.
    Met,
    /// Resolved at or after the effective deadline.
    Missed,
}

/// Outcome of a resolved case, or `None` if it has no resolution yet.
#[must_use]
pub fn resolution_outcome(case: &Case) -> Option<Outcome> {
    let resolved_at = case.resolved_at()?;
    if remaining(case, resolved_at) > TimeDelta::zero() {
        Some(Outcome::Met)
    } else {
        Some(Outcome::Missed)
    }
}

/// Dimension a compliance report is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Owning team.
    Team,
    /// Assigned specialist.
    Specialist,
    /// Case priority.
    Priority,
    /// Case category.
    Category,
}

impl GroupBy {
    fn key(self, case: &Case) -> String {
        fn or_unassigned(id: Option<impl ToString>) -> String {
            id.map_or_else(|| "unassigned".to_string(), |id| id.to_string())
        }
        match self {
            Self::Team => or_unassigned(case.team_id),
            Self::Specialist => or_unassigned(case.assignee_id),
            Self::Priority => case.priority.to_string(),
            Self::Category => case.category.to_string(),
        }
    }

    /// The wire name of the dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Specialist => "specialist",
            Self::Priority => "priority",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = SlaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Team, Self::Specialist, Self::Priority, Self::Category]
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SlaError::UnknownVariant {
                kind: "report grouping",
                value: s.to_string(),
            })
    }
}

/// Met/missed tally for one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceBucket {
    /// Group key (team or specialist id, priority, category, or "unassigned").
    pub key: String,
    /// Resolved within SLA.
    pub met: u32,
    /// Resolved late.
    pub missed: u32,
}

impl ComplianceBucket {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Met => self.met += 1,
            Outcome::Missed => self.missed += 1,
        }
    }

    /// Resolved cases in this bucket.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.met + self.missed
    }

    /// Percentage met, or `None` when nothing was resolved.
    #[must_use]
    pub fn compliance_percent(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| f64::from(self.met) / f64::from(total) * 100.0)
    }
}

/// SLA compliance of resolved cases, grouped by one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    /// Grouping dimension.
    pub group_by: GroupBy,
    /// One bucket per key, sorted by key.
    pub buckets: Vec<ComplianceBucket>,
    /// All groups combined.
    pub overall: ComplianceBucket,
}

impl ComplianceReport {
    /// Build a report over every resolved case in `cases`.
    #[must_use]
    pub fn compute<'a, I>(cases: I, group_by: GroupBy) -> Self
    where
        I: IntoIterator<Item = &'a Case>,
    {
        let mut groups: BTreeMap<String, ComplianceBucket> = BTreeMap::new();
        let mut overall = ComplianceBucket {
            key: "all".to_string(),
            ..ComplianceBucket::default()
        };
        for case in cases {
            let Some(outcome) = resolution_outcome(case) else {
                continue;
            };
            let key = group_by.key(case);
            groups
                .entry(key.clone())
                .or_insert_with(|| ComplianceBucket {
                    key,
                    ..ComplianceBucket::default()
                })
                .record(outcome);
            overall.record(outcome);
        }
        Self {
            group_by,
            buckets: groups.into_values().collect(),
            overall,
        }
    }
}

/// Compliance of cases resolved on one day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// Resolution date.
    pub date: NaiveDate,
    /// Resolved within SLA that day.
    pub met: u32,
    /// Resolved late that day.
    pub missed: u32,
}

/// Daily compliance for resolutions between `from` and `to`, inclusive.
///
/// Every day in the range gets a point, including days with no resolutions.
/// An inverted range yields no points.
#[must_use]
pub fn compliance_trend<'a, I>(cases: I, from: NaiveDate, to: NaiveDate) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Case>,
{
    let mut points: Vec<TrendPoint> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|date| TrendPoint {
            date,
            met: 0,
            missed: 0,
        })
        .collect();
    if points.is_empty() {
        return points;
    }

    for case in cases {
        let (Some(resolved_at), Some(outcome)) = (case.resolved_at(), resolution_outcome(case))
        else {
            continue;
        };
        let day = resolved_at.date_naive();
        if day < from || day > to {
            continue;
        }
        let Ok(index) = usize::try_from((day - from).num_days()) else {
            continue;
        };
        if let Some(point) = points.get_mut(index) {
            match outcome {
                Outcome::Met => point.met += 1,
                Outcome::Missed => point.missed += 1,
            }
        }
    }
    points
}

/// Mean resolution time against mean target for one priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionVsTarget {
    /// Priority the figures apply to.
    pub priority: Priority,
    /// Resolved cases counted.
    pub resolved: u32,
    /// Mean effective (pause-excluded) resolution time, in hours.
    pub mean_resolution_hours: f64,
    /// Mean SLA target, in hours.
    pub mean_target_hours: f64,
}

/// Compare effective resolution time with the SLA target, per priority.
///
/// Priorities with no resolved cases are omitted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn resolution_vs_target<'a, I>(cases: I) -> Vec<ResolutionVsTarget>
where
    I: IntoIterator<Item = &'a Case>,
{
    const MS_PER_HOUR: f64 = 3_600_000.0;

    // priority -> (count, resolution ms, target ms)
    let mut sums: BTreeMap<Priority, (u32, i64, i64)> = BTreeMap::new();
    for case in cases {
        let Some(resolved_at) = case.resolved_at() else {
            continue;
        };
        let entry = sums.entry(case.priority).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 = entry
            .1
            .saturating_add(effective_elapsed(case, resolved_at).num_milliseconds());
        entry.2 = entry.2.saturating_add(sla_window(case).num_milliseconds());
    }

    sums.into_iter()
        .map(|(priority, (count, resolution_ms, target_ms))| {
            let n = f64::from(count);
            ResolutionVsTarget {
                priority,
                resolved: count,
                mean_resolution_hours: resolution_ms as f64 / n / MS_PER_HOUR,
                mean_target_hours: target_ms as f64 / n / MS_PER_HOUR,
            }
        })
        .collect()
}

/// Live cases ordered most urgent first: least remaining time, then
/// priority, then id.
#[must_use]
pub fn urgency_order<'a, I>(cases: I, now: DateTime<Utc>) -> Vec<&'a Case>
where
    I: IntoIterator<Item = &'a Case>,
{
    let mut live: Vec<(TimeDelta, &Case)> = cases
        .into_iter()
        .filter(|case| !case.is_sla_exempt())
        .map(|case| (remaining(case, now), case))
        .collect();
    live.sort_by(|(a_left, a), (b_left, b)| {
        a_left
            .cmp(b_left)
            .then(a.priority.cmp(&b.priority))
            .then(a.id.cmp(&b.id))
    });
    live.into_iter().map(|(_, case)| case).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::resolve;
    use crate::policy::PolicyTable;
    use crate::types::{CaseStatus, PauseReason};
    use caseflow_core::{CaseId, CategoryId, TeamId};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-06T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn hours(h: i64) -> TimeDelta {
        TimeDelta::hours(h)
    }

    fn case(priority: Priority, created_at: DateTime<Utc>) -> Case {
        Case::open(
            CaseId::generate(),
            "Claim denied in error",
            priority,
            CategoryId::new("claims").unwrap(),
            created_at,
            &PolicyTable::default(),
        )
    }

    fn resolved(priority: Priority, after: TimeDelta) -> Case {
        let mut c = case(priority, t0());
        let _ = resolve(&mut c, t0() + after, None);
        c
    }

    #[test]
    fn dashboard_counts() {
        let config = SlaConfig::default();
        let now = t0() + hours(3);

        let on_track = case(Priority::High, t0()); // 21h left: due soon
        let at_risk = case(Priority::Urgent, t0()); // 1h left of 4h
        let breached = case(Priority::Urgent, t0() - hours(2));
        let mut paused = case(Priority::Medium, t0());
        let _ = paused.sla.pause(PauseReason::AwaitingProvider, t0());
        let done = resolved(Priority::Urgent, hours(2));
        let mut closed = case(Priority::Low, t0());
        closed.status = CaseStatus::Closed;

        let cases = [on_track, at_risk, breached, paused, done, closed];
        let summary = DashboardSummary::compute(&cases, now, &config);

        assert_eq!(summary.open, 4);
        assert_eq!(summary.on_track, 2);
        assert_eq!(summary.at_risk, 1);
        assert_eq!(summary.breached, 1);
        assert_eq!(summary.paused, 1);
        assert_eq!(summary.due_soon, 2);
        assert_eq!(summary.exempt, 2);
    }

    #[test]
    fn resolved_case_excluded_from_live_counts() {
        let config = SlaConfig::default();
        let done = resolved(Priority::Urgent, hours(2));
        let summary = DashboardSummary::compute([&done], t0() + hours(10), &config);
        assert_eq!(summary.open, 0);
        assert_eq!(summary.breached, 0);
        assert_eq!(summary.exempt, 1);
    }

    #[test]
    fn outcome_respects_pauses() {
        assert_eq!(
            resolution_outcome(&resolved(Priority::Urgent, hours(2))),
            Some(Outcome::Met)
        );
        assert_eq!(
            resolution_outcome(&resolved(Priority::Urgent, hours(4))),
            Some(Outcome::Missed)
        );

        let mut paused = case(Priority::Urgent, t0());
        let paused_at = t0() + hours(1);
        let _ = paused.sla.pause(PauseReason::AwaitingProvider, paused_at);
        let _ = paused.sla.resume(t0() + hours(5));
        let _ = resolve(&mut paused, t0() + hours(7), None);
        assert_eq!(resolution_outcome(&paused), Some(Outcome::Met));

        assert_eq!(resolution_outcome(&case(Priority::Low, t0())), None);
    }

    #[test]
    fn compliance_by_team() {
        let team_a = TeamId::generate();
        let team_b = TeamId::generate();

        let mut a1 = resolved(Priority::Urgent, hours(1));
        a1.team_id = Some(team_a);
        let mut a2 = resolved(Priority::Urgent, hours(5));
        a2.team_id = Some(team_a);
        let mut b1 = resolved(Priority::High, hours(2));
        b1.team_id = Some(team_b);
        let unassigned = resolved(Priority::High, hours(30));
        let live = case(Priority::Low, t0());

        let cases = [a1, a2, b1, unassigned, live];
        let report = ComplianceReport::compute(&cases, GroupBy::Team);

        assert_eq!(report.overall.met, 2);
        assert_eq!(report.overall.missed, 2);
        assert_eq!(report.overall.compliance_percent(), Some(50.0));

        let bucket = |key: &str| report.buckets.iter().find(|b| b.key == key).unwrap();
        assert_eq!(bucket(&team_a.to_string()).compliance_percent(), Some(50.0));
        assert_eq!(
            bucket(&team_b.to_string()).compliance_percent(),
            Some(100.0)
        );
        assert_eq!(bucket("unassigned").compliance_percent(), Some(0.0));
        assert_eq!(report.buckets.len(), 3);
    }

    #[test]
    fn compliance_by_priority_sorted_by_key() {
        let cases = [
            resolved(Priority::Urgent, hours(1)),
            resolved(Priority::High, hours(1)),
        ];
        let report = ComplianceReport::compute(&cases, GroupBy::Priority);
        let keys: Vec<_> = report.buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["high", "urgent"]);
    }

    #[test]
    fn empty_bucket_has_no_percentage() {
        assert_eq!(ComplianceBucket::default().compliance_percent(), None);
    }

    #[test]
    fn group_by_parse() {
        assert_eq!(
            "specialist".parse::<GroupBy>().unwrap(),
            GroupBy::Specialist
        );
        assert!("region".parse::<GroupBy>().is_err());
    }

    #[test]
    fn trend_fills_every_day() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let cases = [
            resolved(Priority::Urgent, hours(1)),  // 05-06, met
            resolved(Priority::Urgent, hours(30)), // 05-07, missed
            resolved(Priority::Low, hours(30)),    // 05-07, met
            resolved(Priority::Low, hours(400)),   // outside range
        ];
        let trend = compliance_trend(&cases, day(6), day(8));
        assert_eq!(trend.len(), 3);
        assert_eq!((trend[0].met, trend[0].missed), (1, 0));
        assert_eq!((trend[1].met, trend[1].missed), (1, 1));
        assert_eq!((trend[2].met, trend[2].missed), (0, 0));

        assert!(compliance_trend(&cases, day(8), day(6)).is_empty());
    }

    #[test]
    fn resolution_vs_target_means() {
        let mut paused = case(Priority::Urgent, t0());
        let _ = paused.sla.pause(PauseReason::AwaitingProvider, t0());
        let _ = paused.sla.resume(t0() + hours(2));
        let _ = resolve(&mut paused, t0() + hours(5), None);

        let cases = [resolved(Priority::Urgent, hours(1)), paused];
        let rows = resolution_vs_target(&cases);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.priority, Priority::Urgent);
        assert_eq!(row.resolved, 2);
        // (1h + 3h effective) / 2
        assert!((row.mean_resolution_hours - 2.0).abs() < 1e-9);
        assert!((row.mean_target_hours - 4.0).abs() < 1e-9);
    }

    #[test]
    fn urgency_order_least_remaining_first() {
        let now = t0() + hours(1);
        let low = case(Priority::Low, t0());
        let urgent = case(Priority::Urgent, t0());
        let overdue = case(Priority::High, t0() - hours(30));
        let done = resolved(Priority::Urgent, hours(1));

        let cases = [low.clone(), urgent.clone(), overdue.clone(), done];
        let ordered: Vec<CaseId> = urgency_order(&cases, now).iter().map(|c| c.id).collect();
        assert_eq!(ordered, vec![overdue.id, urgent.id, low.id]);
    }
}

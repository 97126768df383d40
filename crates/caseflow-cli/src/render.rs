//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use caseflow_desk::SlaSnapshot;
use caseflow_sla::{ComplianceBucket, ComplianceReport, DashboardSummary, SlaState, TrendPoint};
use chrono::{DateTime, Utc};

const BAR_WIDTH: usize = 20;

/// Badge text for a compliance state.
pub const fn badge(state: Option<SlaState>) -> &'static str {
    match state {
        Some(SlaState::OnTrack) => "on track",
        Some(SlaState::AtRisk) => "AT RISK",
        Some(SlaState::Breached) => "BREACHED",
        None => "exempt",
    }
}

/// A fixed-width bar for the share of the window used.
///
/// The engine reports values above 100 for breached cases; the bar stops at
/// full.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&".".repeat(width - filled));
    bar.push(']');
    bar
}

/// One row of a case list.
pub fn snapshot_line(snapshot: &SlaSnapshot) -> String {
    let mut line = format!(
        "{}  {:<6}  {:<8}  {} {:>5.1}%  {}",
        snapshot.case_id,
        snapshot.priority.as_str(),
        badge(snapshot.state),
        progress_bar(snapshot.percentage_used, BAR_WIDTH),
        snapshot.percentage_used,
        snapshot.remaining.formatted,
    );
    if let Some(reason) = snapshot.paused_for {
        let _ = write!(line, "  (paused: {})", reason.label());
    }
    line
}

/// Detailed view of one case.
pub fn status_block(snapshot: &SlaSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", snapshot.case_id, snapshot.title);
    let _ = writeln!(out, "  priority:      {}", snapshot.priority);
    let _ = writeln!(out, "  status:        {}", snapshot.status);
    let _ = writeln!(out, "  sla:           {}", badge(snapshot.state));
    if !snapshot.is_exempt() {
        let _ = writeln!(out, "  remaining:     {}", snapshot.remaining.formatted);
    }
    let _ = writeln!(out, "  due:           {}", snapshot.due_at.to_rfc3339());
    if snapshot.effective_due_at != snapshot.due_at {
        let _ = writeln!(
            out,
            "  effective due: {}",
            snapshot.effective_due_at.to_rfc3339()
        );
    }
    let _ = writeln!(
        out,
        "  used:          {} {:.1}%",
        progress_bar(snapshot.percentage_used, BAR_WIDTH),
        snapshot.percentage_used
    );
    if let Some(reason) = snapshot.paused_for {
        let _ = writeln!(out, "  paused:        {}", reason.label());
    }
    out
}

/// Dashboard counts.
pub fn dashboard(summary: &DashboardSummary) -> String {
    let rows = [
        ("Open", summary.open),
        ("On track", summary.on_track),
        ("At risk", summary.at_risk),
        ("Breached", summary.breached),
        ("Paused", summary.paused),
        ("Due soon", summary.due_soon),
        ("Resolved/closed", summary.exempt),
    ];
    let mut out = String::new();
    for (label, count) in rows {
        let _ = writeln!(out, "{label:<16} {count:>5}");
    }
    out
}

fn bucket_line(bucket: &ComplianceBucket) -> String {
    let percent = bucket
        .compliance_percent()
        .map_or_else(|| "-".to_string(), |p| format!("{p:.1}%"));
    format!(
        "{:<38} {:>5} {:>5} {:>7}",
        bucket.key, bucket.met, bucket.missed, percent
    )
}

/// Compliance table.
pub fn report(report: &ComplianceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<38} {:>5} {:>5} {:>7}",
        report.group_by.as_str(),
        "met",
        "miss",
        "rate"
    );
    for bucket in &report.buckets {
        let _ = writeln!(out, "{}", bucket_line(bucket));
    }
    let _ = writeln!(out, "{}", bucket_line(&report.overall));
    out
}

/// Daily compliance trend.
pub fn trend(points: &[TrendPoint]) -> String {
    let mut out = String::new();
    for point in points {
        let _ = writeln!(out, "{}  met {:>4}  missed {:>4}", point.date, point.met, point.missed);
    }
    out
}

/// One refresh of the `watch` display.
pub fn watch_frame(now: DateTime<Utc>, snapshots: &[SlaSnapshot]) -> String {
    let mut out = format!("-- {} --\n", now.format("%Y-%m-%d %H:%M:%S UTC"));
    if snapshots.is_empty() {
        out.push_str("No cases at risk.\n");
    }
    for snapshot in snapshots {
        let _ = writeln!(out, "{}", snapshot_line(snapshot));
    }
    out
}

//! Caseflow CLI - SLA dashboards and case actions over a JSON case file.
//!
//! This is the entry point for the `caseflow` binary.

mod cases;
mod render;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use caseflow_core::{CaseId, CategoryId, SpecialistId, TeamId};
use caseflow_desk::{CaseDesk, CreateCaseRequest, Desk, SlaSnapshot};
use caseflow_sla::{
    compute_due_date, urgency_order, GroupBy, PauseReason, Priority, SlaConfig, Transition,
};
use caseflow_store::MemoryStore;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Caseflow CLI - track provider-relations case SLAs.
#[derive(Parser, Debug)]
#[command(name = "caseflow")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON case file.
    #[arg(long, global = true, env = "CASEFLOW_CASES", default_value = "cases.json")]
    cases: PathBuf,

    /// JSON SLA configuration. Defaults apply when omitted.
    #[arg(long, global = true, env = "CASEFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Evaluate at this RFC 3339 instant instead of the current time.
    #[arg(long, global = true)]
    at: Option<DateTime<Utc>>,

    /// Print JSON instead of text.
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    /// Enable debug logging.
    #[arg(long, global = true, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the SLA state of one case.
    Status {
        /// Case ID.
        case_id: CaseId,
    },

    /// List live cases, most urgent first.
    List {
        /// Only cases at risk or breached.
        #[arg(long)]
        at_risk: bool,
    },

    /// Show dashboard counts.
    Dashboard,

    /// Show compliance of resolved cases.
    Report {
        /// team, specialist, priority or category.
        #[arg(long, default_value = "priority")]
        group_by: GroupBy,
    },

    /// Show daily compliance between two dates (inclusive).
    Trend {
        /// First day, e.g. 2024-05-01.
        #[arg(long)]
        from: NaiveDate,
        /// Last day. Defaults to today.
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Compute the due date a new case would get.
    DueDate {
        /// Case priority.
        #[arg(long)]
        priority: Priority,
        /// Case category.
        #[arg(long)]
        category: CategoryId,
    },

    /// Open a new case.
    Open {
        /// Case title.
        title: String,
        /// Case priority.
        #[arg(long)]
        priority: Priority,
        /// Case category.
        #[arg(long)]
        category: CategoryId,
        /// Optional subcategory.
        #[arg(long)]
        subcategory: Option<String>,
        /// Owning team ID.
        #[arg(long)]
        team: Option<TeamId>,
        /// Assigned specialist ID.
        #[arg(long)]
        assignee: Option<SpecialistId>,
    },

    /// Pause the SLA clock.
    Pause {
        /// Case ID.
        case_id: CaseId,
        /// Why the clock is paused.
        #[arg(long)]
        reason: PauseReason,
    },

    /// Resume the SLA clock.
    Resume {
        /// Case ID.
        case_id: CaseId,
    },

    /// Resolve a case, stopping its clock.
    Resolve {
        /// Case ID.
        case_id: CaseId,
        /// Resolution summary.
        #[arg(long)]
        summary: Option<String>,
    },

    /// Close a case.
    Close {
        /// Case ID.
        case_id: CaseId,
    },

    /// Re-render countdowns until interrupted.
    Watch {
        /// Watch one case instead of every at-risk case.
        case_id: Option<CaseId>,
    },
}

impl Command {
    const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Open { .. }
                | Self::Pause { .. }
                | Self::Resume { .. }
                | Self::Resolve { .. }
                | Self::Close { .. }
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --debug.
    let default_filter = if args.debug { "caseflow=debug,warn" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cases::load_config(args.config.as_deref())?;

    if let Command::Watch { case_id } = args.command {
        return watch(&args.cases, config, case_id).await;
    }

    let now = args.at.unwrap_or_else(Utc::now);
    let desk = cases::open_desk(&args.cases, config)?;
    let output = run(&desk, &args.command, now, args.json)?;
    if args.command.is_mutating() {
        cases::save_desk(&args.cases, &desk)?;
    }
    print!("{output}");

    Ok(())
}

/// Execute one command and return its output.
fn run(
    desk: &CaseDesk<MemoryStore>,
    command: &Command,
    now: DateTime<Utc>,
    as_json: bool,
) -> anyhow::Result<String> {
    let output = match command {
        Command::Status { case_id } => {
            let snapshot = desk.sla_status(case_id, now)?;
            if as_json {
                to_json(&snapshot)?
            } else {
                render::status_block(&snapshot)
            }
        }
        Command::List { at_risk } => {
            let snapshots = if *at_risk {
                desk.at_risk_cases(now)?
            } else {
                let cases = desk.list_cases()?;
                urgency_order(&cases, now)
                    .into_iter()
                    .map(|case| SlaSnapshot::of(case, now, desk.config()))
                    .collect()
            };
            if as_json {
                to_json(&snapshots)?
            } else {
                snapshots
                    .iter()
                    .map(|s| render::snapshot_line(s) + "\n")
                    .collect()
            }
        }
        Command::Dashboard => {
            let summary = desk.dashboard(now)?;
            if as_json {
                to_json(&summary)?
            } else {
                render::dashboard(&summary)
            }
        }
        Command::Report { group_by } => {
            let report = desk.compliance_report(*group_by)?;
            if as_json {
                to_json(&report)?
            } else {
                render::report(&report)
            }
        }
        Command::Trend { from, to } => {
            let to = to.unwrap_or_else(|| now.date_naive());
            let points = desk.compliance_trend(*from, to)?;
            if as_json {
                to_json(&points)?
            } else {
                render::trend(&points)
            }
        }
        Command::DueDate { priority, category } => {
            let policy = &desk.config().policy;
            let due_at = compute_due_date(now, *priority, category, policy);
            let hours = policy.target_hours(category, *priority);
            if as_json {
                to_json(&json!({ "due_at": due_at, "target_hours": hours }))?
            } else {
                format!("{} ({hours}h)\n", due_at.to_rfc3339())
            }
        }
        Command::Open {
            title,
            priority,
            category,
            subcategory,
            team,
            assignee,
        } => {
            let mut request = CreateCaseRequest::new(title.clone(), *priority, category.clone());
            request.subcategory.clone_from(subcategory);
            request.team_id = *team;
            request.assignee_id = *assignee;
            let case = desk.open_case(request, now)?;
            if as_json {
                to_json(&case)?
            } else {
                format!("{}  due {}\n", case.id, case.sla.due_at.to_rfc3339())
            }
        }
        Command::Pause { case_id, reason } => {
            let (_, transition) = desk.pause_case(case_id, *reason, now)?;
            action_output(desk, case_id, now, transition, "already paused", as_json)?
        }
        Command::Resume { case_id } => {
            let (_, transition) = desk.resume_case(case_id, now)?;
            action_output(desk, case_id, now, transition, "already running", as_json)?
        }
        Command::Resolve { case_id, summary } => {
            let (_, transition) = desk.resolve_case(case_id, summary.clone(), now)?;
            action_output(desk, case_id, now, transition, "already resolved", as_json)?
        }
        Command::Close { case_id } => {
            let (_, transition) = desk.close_case(case_id, now)?;
            action_output(desk, case_id, now, transition, "already closed", as_json)?
        }
        Command::Watch { .. } => anyhow::bail!("watch is handled by the async loop"),
    };
    Ok(output)
}

fn action_output(
    desk: &CaseDesk<MemoryStore>,
    case_id: &CaseId,
    now: DateTime<Utc>,
    transition: Transition,
    unchanged: &str,
    as_json: bool,
) -> anyhow::Result<String> {
    let snapshot = desk.sla_status(case_id, now)?;
    if as_json {
        return to_json(&snapshot);
    }
    let mut out = render::status_block(&snapshot);
    if !transition.is_applied() {
        let _ = writeln!(out, "  note:          {unchanged}");
    }
    Ok(out)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

/// Re-read the case file and redraw countdowns on every refresh tick.
async fn watch(
    cases_path: &Path,
    config: SlaConfig,
    case_id: Option<CaseId>,
) -> anyhow::Result<()> {
    let refresh = config.countdown_refresh();
    let mut interval = tokio::time::interval(refresh);
    tracing::debug!(
        refresh_secs = refresh.as_secs(),
        "Watching {}",
        cases_path.display()
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let desk = cases::open_desk(cases_path, config.clone())?;
                let now = Utc::now();
                let snapshots = match case_id {
                    Some(id) => vec![desk.sla_status(&id, now)?],
                    None => desk.at_risk_cases(now)?,
                };
                print!("{}", render::watch_frame(now, &snapshots));
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                return Ok(());
            }
        }
    }
}

//! Run-all orchestration and the feature-count report
//!
//! Every checker runs in isolation: an error or a panic is recorded against
//! that checker and the sequence goes on. Only cancellation stops it.

use crate::checks::{all_checkers, CheckContext, Checker};
use crate::error::{QaError, QaResult};
use crate::model::Project;
use crate::report::{CheckReport, Selection};
use crate::rules::names::{sanity_group, BATIMENT};
use serde::Serialize;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{error, info, warn};

/// Below this many buildings the count report asks for confirmation
pub const FEW_BUILDINGS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Flagged,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRun {
    pub checker: String,
    pub outcome: CheckOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CheckReport>,
    pub elapsed_ms: u64,
}

impl CheckRun {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub runs: Vec<CheckRun>,
    /// Union of the selections of every completed checker
    pub selection: Selection,
    pub cancelled: bool,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &CheckRun> {
        self.runs.iter().filter(|r| r.is_failed())
    }

    /// Every checker ran to completion, whatever it found
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failures().next().is_none()
    }

    pub fn summary(&self) -> String {
        let failed: Vec<&CheckRun> = self.failures().collect();
        if failed.is_empty() && !self.cancelled {
            return format!("All {} checks ran successfully.", self.runs.len());
        }
        let mut out = String::from("Some checks failed:\n");
        for run in failed {
            if let CheckOutcome::Failed { reason } = &run.outcome {
                let _ = writeln!(out, "{} -> {}", run.checker, reason);
            }
        }
        if self.cancelled {
            out.push_str("Run cancelled.\n");
        }
        out
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "checker panicked".to_string()
    }
}

/// Run one checker, turning errors and panics into a failed outcome
pub fn run_check(checker: &dyn Checker, ctx: &CheckContext<'_>) -> CheckRun {
    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| checker.run(ctx)));
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let (outcome, report) = match result {
        Ok(Ok(report)) => {
            let outcome = if report.is_clean() {
                CheckOutcome::Passed
            } else {
                CheckOutcome::Flagged
            };
            (outcome, Some(report))
        }
        Ok(Err(e)) => {
            warn!("[Runner] {} failed: {}", checker.name(), e);
            (CheckOutcome::Failed { reason: e.to_string() }, None)
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!("[Runner] {} panicked: {}", checker.name(), reason);
            (CheckOutcome::Failed { reason }, None)
        }
    };

    CheckRun {
        checker: checker.name().to_string(),
        outcome,
        report,
        elapsed_ms,
    }
}

/// Run the given checkers in order
pub fn run_sequence(checkers: &[Box<dyn Checker>], ctx: &CheckContext<'_>) -> RunReport {
    let start = Instant::now();
    let mut out = RunReport::default();

    for checker in checkers {
        if ctx.is_cancelled() {
            out.cancelled = true;
            break;
        }
        let run = run_check(checker.as_ref(), ctx);
        if let Some(report) = &run.report {
            out.selection.merge(&report.selection);
        }
        out.runs.push(run);
        if ctx.is_cancelled() {
            out.cancelled = true;
            break;
        }
    }

    info!(
        "[Runner] {} check(s) run, {} failed, {} feature(s) selected in {:.2?}",
        out.runs.len(),
        out.failures().count(),
        out.selection.total(),
        start.elapsed()
    );
    out
}

/// All eleven checkers in sequence
pub fn run_all(ctx: &CheckContext<'_>) -> RunReport {
    run_sequence(&all_checkers(), ctx)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerCount {
    pub layer: String,
    /// `None` when the layer is not in the project
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerCountReport {
    pub group: String,
    pub layers: Vec<LayerCount>,
    pub warnings: Vec<String>,
}

impl LayerCountReport {
    pub fn render_text(&self) -> String {
        let mut out = format!("Layers of group '{}':\n", self.group);
        for entry in &self.layers {
            match entry.count {
                Some(n) => {
                    let _ = writeln!(out, "{}: {} feature(s)", entry.layer, n);
                }
                None => {
                    let _ = writeln!(out, "{}: not found", entry.layer);
                }
            }
        }
        for w in &self.warnings {
            let _ = writeln!(out, "[warning] {}", w);
        }
        out
    }
}

/// Informational presence and size report for the expected layers of a group
pub fn layer_counts(project: &Project, group: &str) -> QaResult<LayerCountReport> {
    let expected =
        sanity_group(group).ok_or_else(|| QaError::UnknownGroup(group.to_string()))?;
    let mut report = LayerCountReport {
        group: group.to_string(),
        layers: Vec::with_capacity(expected.len()),
        warnings: Vec::new(),
    };

    for &name in expected {
        let count = project.layer(name).map(|l| l.len());
        match count {
            None => report.warnings.push(format!("layer '{}' not found in project", name)),
            Some(0) => report.warnings.push(format!("layer '{}' has no features", name)),
            Some(_) => {}
        }
        if let Some(n) = count {
            if name.eq_ignore_ascii_case(BATIMENT) && n < FEW_BUILDINGS {
                report.warnings.push(format!(
                    "only {} building(s) in '{}', please confirm this is expected",
                    n, name
                ));
            }
        }
        report.layers.push(LayerCount {
            layer: name.to_string(),
            count,
        });
    }

    info!(
        "[Runner] layer counts for '{}': {} warning(s)",
        group,
        report.warnings.len()
    );
    Ok(report)
}

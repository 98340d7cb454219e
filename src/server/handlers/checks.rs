//! Check handlers: RunCheck, RunAll, LayerCounts, GetSelection

use super::{loaded_project, no_project};
use crate::checks::{CheckContext, CheckKind, Progress};
use crate::model::FeatureId;
use crate::report::CheckReport;
use crate::runner::{layer_counts, run_all, LayerCountReport, RunReport};
use crate::server::protocol::{error_codes, parse_params, Response};
use crate::server::state::ServerState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn log_progress(p: Progress) {
    debug!("[Server] {}: {}/{}", p.checker, p.done, p.total);
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub report: CheckReport,
    pub text: String,
}

/// Handle RunCheck request - runs one checker and selects what it flagged
pub fn handle_run_check(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct RunCheckParams {
        check: String,
        #[serde(default)]
        group: Option<String>,
    }

    let params: RunCheckParams =
        match parse_params(id.clone(), params, "{check: string, group?: string}") {
            Ok(p) => p,
            Err(e) => return e,
        };
    let kind: CheckKind = match params.check.parse() {
        Ok(k) => k,
        Err(e) => return Response::qa_error(id, &e),
    };

    let result = {
        let project = match loaded_project(state, &id) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let ctx = CheckContext::new(project, &state.config, &state.rules)
            .with_progress(&log_progress);
        kind.checker(params.group.as_deref()).run(&ctx)
    };

    let report = match result {
        Ok(r) => r,
        Err(e) => return Response::qa_error(id, &e),
    };
    if let Some(project) = state.project.as_mut() {
        project.apply_selection(&report.selection);
    }
    info!(
        "[Server] {}: {} finding(s), {} selected",
        kind,
        report.findings.len(),
        report.selection.total()
    );

    let text = report.render_text();
    Response::typed(id, &CheckResult { report, text })
}

#[derive(Debug, Serialize)]
pub struct RunAllResult {
    pub run: RunReport,
    pub success: bool,
    pub summary: String,
}

/// Handle RunAll request - runs every checker in sequence
pub fn handle_run_all(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    let run = {
        let project = match loaded_project(state, &id) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let ctx = CheckContext::new(project, &state.config, &state.rules)
            .with_progress(&log_progress);
        run_all(&ctx)
    };

    if let Some(project) = state.project.as_mut() {
        project.apply_selection(&run.selection);
    }
    let result = RunAllResult {
        success: run.is_success(),
        summary: run.summary(),
        run,
    };
    Response::typed(id, &result)
}

#[derive(Debug, Serialize)]
pub struct LayerCountResult {
    pub report: LayerCountReport,
    pub text: String,
}

/// Handle LayerCounts request - feature-count report for one group
pub fn handle_layer_counts(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct LayerCountsParams {
        group: String,
    }

    let params: LayerCountsParams = match parse_params(id.clone(), params, "{group: string}") {
        Ok(p) => p,
        Err(e) => return e,
    };
    let project = match loaded_project(state, &id) {
        Ok(p) => p,
        Err(e) => return e,
    };
    match layer_counts(project, &params.group) {
        Ok(report) => {
            let text = report.render_text();
            Response::typed(id, &LayerCountResult { report, text })
        }
        Err(e) => Response::qa_error(id, &e),
    }
}

/// Handle GetSelection request - ids currently selected on a layer
pub fn handle_get_selection(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct GetSelectionParams {
        layer: String,
    }

    let params: GetSelectionParams = match parse_params(id.clone(), params, "{layer: string}") {
        Ok(p) => p,
        Err(e) => return e,
    };
    let Some(project) = state.project.as_ref() else {
        return no_project(id);
    };
    let Some(layer) = project.layer(&params.layer) else {
        return Response::error(
            id,
            error_codes::LAYER_NOT_FOUND,
            format!("Layer not found: {}", params.layer),
        );
    };
    let ids: Vec<FeatureId> = layer.selection().iter().copied().collect();
    Response::success(id, serde_json::json!({ "layer": layer.name, "ids": ids }))
}

//! Remediation handlers: RenameAll, FillMissing, DeletePhantoms
//!
//! Every one of them mutates the project and refuses to run unless the
//! request carries `confirm: true`.

use super::no_project;
use crate::checks::{CheckContext, Checker, NullValuesChecker, PhantomChecker};
use crate::error::QaResult;
use crate::remediation::{delete_phantoms, fill_missing, rename_all, RemediationReport};
use crate::server::protocol::{error_codes, parse_params, Response};
use crate::server::state::ServerState;
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
struct ConfirmParams {
    #[serde(default)]
    confirm: bool,
}

fn not_confirmed(id: Option<serde_json::Value>, action: &str) -> Response {
    Response::error(
        id,
        error_codes::NOT_CONFIRMED,
        format!("{} modifies the project: resend with confirm: true", action),
    )
}

/// Select the features left for follow-up and answer with the report
fn finish(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    result: QaResult<RemediationReport>,
) -> Response {
    let report = match result {
        Ok(r) => r,
        Err(e) => return Response::qa_error(id, &e),
    };
    if let Some(project) = state.project.as_mut() {
        project.apply_selection(&report.failed);
    }
    if report.total_applied() > 0 {
        state.modified = true;
    }
    info!(
        "[Server] {:?}: {} edit(s), {} failure(s), {} warning(s)",
        report.action,
        report.total_applied(),
        report.errors.len(),
        report.warnings.len()
    );
    Response::typed(id, &report)
}

/// Handle RenameAll request - renames points from a zone name, lines from their ends
pub fn handle_rename_all(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct RenameParams {
        zone: String,
        #[serde(default)]
        confirm: bool,
    }

    let params: RenameParams = match parse_params(id.clone(), params, "{zone: string, confirm: bool}")
    {
        Ok(p) => p,
        Err(e) => return e,
    };
    if !params.confirm {
        return not_confirmed(id, "RenameAll");
    }
    let Some(project) = state.project.as_mut() else {
        return no_project(id);
    };
    let result = rename_all(project, &params.zone);
    finish(state, id, result)
}

/// Handle FillMissing request - re-runs the null check, then fills
pub fn handle_fill_missing(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let params: ConfirmParams = match parse_params(id.clone(), params, "{confirm: bool}") {
        Ok(p) => p,
        Err(e) => return e,
    };
    if !params.confirm {
        return not_confirmed(id, "FillMissing");
    }
    let Some(project) = state.project.as_mut() else {
        return no_project(id);
    };
    let result = {
        let ctx = CheckContext::new(project, &state.config, &state.rules);
        NullValuesChecker.run(&ctx)
    }
    .and_then(|nulls| fill_missing(project, &state.config, &nulls));
    finish(state, id, result)
}

/// Handle DeletePhantoms request - re-runs the phantom check, then deletes
pub fn handle_delete_phantoms(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let params: ConfirmParams = match parse_params(id.clone(), params, "{confirm: bool}") {
        Ok(p) => p,
        Err(e) => return e,
    };
    if !params.confirm {
        return not_confirmed(id, "DeletePhantoms");
    }
    let Some(project) = state.project.as_mut() else {
        return no_project(id);
    };
    let result = {
        let ctx = CheckContext::new(project, &state.config, &state.rules);
        PhantomChecker.run(&ctx)
    }
    .and_then(|phantoms| delete_phantoms(project, &phantoms));
    finish(state, id, result)
}

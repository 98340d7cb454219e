//! Handler module declarations and request dispatch

pub mod checks;
pub mod config;
pub mod file;
pub mod remediation;

pub use checks::*;
pub use config::*;
pub use file::*;
pub use remediation::*;

use super::protocol::{error_codes, Request, Response};
use super::state::ServerState;
use crate::model::Project;

/// Route a request to its handler
pub fn dispatch(state: &mut ServerState, request: Request) -> Response {
    let Request { id, method, params } = request;
    match method.as_str() {
        "Load" => handle_load(state, id, params),
        "Save" => handle_save(state, id, params),
        "Close" => handle_close(state, id),
        "GetLayers" => handle_get_layers(state, id),
        "Configure" => handle_configure(state, id, params),
        "GetConfig" => handle_get_config(state, id),
        "RunCheck" => handle_run_check(state, id, params),
        "RunAll" => handle_run_all(state, id),
        "LayerCounts" => handle_layer_counts(state, id, params),
        "GetSelection" => handle_get_selection(state, id, params),
        "RenameAll" => handle_rename_all(state, id, params),
        "FillMissing" => handle_fill_missing(state, id, params),
        "DeletePhantoms" => handle_delete_phantoms(state, id, params),
        _ => Response::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        ),
    }
}

pub(crate) fn no_project(id: Option<serde_json::Value>) -> Response {
    Response::error(
        id,
        error_codes::NO_PROJECT_LOADED,
        "No project loaded. Call Load first.".to_string(),
    )
}

/// The loaded project, or the error response to send back
pub(crate) fn loaded_project<'a>(
    state: &'a ServerState,
    id: &Option<serde_json::Value>,
) -> Result<&'a Project, Response> {
    state.project.as_ref().ok_or_else(|| no_project(id.clone()))
}

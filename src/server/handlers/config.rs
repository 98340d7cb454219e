//! Configuration handlers: Configure, GetConfig

use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use tracing::info;

/// Handle Configure request - overlays a partial config on the active one
pub fn handle_configure(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let patch = match params {
        Some(p @ serde_json::Value::Object(_)) => p,
        _ => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                "Invalid params: expected a (partial) configuration object".to_string(),
            )
        }
    };

    let config = match state.config.merged(&patch) {
        Ok(c) => c,
        Err(e) => return Response::qa_error(id, &e),
    };
    if let Err(e) = state.reconfigure(config) {
        return Response::qa_error(id, &e);
    }
    info!("[Server] Configuration updated");
    Response::typed(id, &state.config)
}

/// Handle GetConfig request - returns the active configuration
pub fn handle_get_config(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    Response::typed(id, &state.config)
}

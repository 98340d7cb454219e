use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use verif_infra::server::{dispatch, error_codes, Request, Response, ServerState};

fn init_logging() {
    // stdout carries the protocol, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Decode one line; a line that is not a request gets an error response
fn parse_request(line: &str) -> Result<Request, Response> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
        Response::error(None, error_codes::PARSE_ERROR, format!("Parse error: {}", e))
    })?;
    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|e| {
        Response::error(id, error_codes::INVALID_REQUEST, format!("Invalid request: {}", e))
    })
}

fn handle_line(state: &mut ServerState, line: &str) -> Response {
    let request = match parse_request(line) {
        Ok(r) => r,
        Err(response) => return response,
    };
    let id = request.id.clone();
    let method = request.method.clone();
    match panic::catch_unwind(AssertUnwindSafe(|| dispatch(state, request))) {
        Ok(response) => response,
        Err(_) => {
            error!("[Server] {} panicked", method);
            Response::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Internal error while handling {}", method),
            )
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    info!("[Server] Starting QA server...");

    let mut state = ServerState::new().context("default configuration rejected")?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("[Server] Error reading stdin: {}", e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&mut state, &line);
        let json = serde_json::to_string(&response).context("failed to encode response")?;
        writeln!(stdout, "{}", json).context("failed to write response")?;
        stdout.flush().context("failed to flush stdout")?;
    }

    info!("[Server] Shutting down...");
    Ok(())
}

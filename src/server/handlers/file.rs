//! File operations: Load, Save, Close, GetLayers

use super::loaded_project;
use crate::config::QaConfig;
use crate::model::{GeometryClass, Project};
use crate::server::protocol::{error_codes, parse_params, Response};
use crate::server::state::ServerState;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

fn load_project(path: &Path) -> anyhow::Result<Project> {
    Project::load(path).with_context(|| format!("Failed to load project {}", path.display()))
}

fn load_config(path: &Path) -> anyhow::Result<QaConfig> {
    QaConfig::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Handle Load request - reads a project file, optionally with a config file
pub fn handle_load(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct LoadParams {
        file_path: PathBuf,
        #[serde(default)]
        config_path: Option<PathBuf>,
    }

    let params: LoadParams =
        match parse_params(id.clone(), params, "{file_path: string, config_path?: string}") {
            Ok(p) => p,
            Err(e) => return e,
        };

    info!("[Server] Loading project: {}", params.file_path.display());
    let start = Instant::now();

    if let Some(config_path) = &params.config_path {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return Response::error(id, error_codes::INVALID_CONFIG, format!("{:#}", e)),
        };
        if let Err(e) = state.reconfigure(config) {
            return Response::qa_error(id, &e);
        }
    }

    let project = match load_project(&params.file_path) {
        Ok(p) => p,
        Err(e) => return Response::error(id, error_codes::LOAD_FAILED, format!("{:#}", e)),
    };
    let layer_count = project.layers().len();
    let feature_count: usize = project.layers().iter().map(|l| l.len()).sum();

    state.project = Some(project);
    state.file_path = Some(params.file_path.clone());
    state.modified = false;

    info!(
        "[Server] Loaded {} layers, {} features in {:.2?}",
        layer_count,
        feature_count,
        start.elapsed()
    );

    Response::success(
        id,
        serde_json::json!({
            "status": "ok",
            "file_path": params.file_path,
            "layer_count": layer_count,
            "feature_count": feature_count
        }),
    )
}

/// Handle Save request - writes the project back, to its own path by default
pub fn handle_save(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize, Default)]
    struct SaveParams {
        #[serde(default)]
        file_path: Option<PathBuf>,
    }

    let params: SaveParams = params
        .and_then(|p| serde_json::from_value(p).ok())
        .unwrap_or_default();

    let project = match loaded_project(state, &id) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let Some(path) = params.file_path.or_else(|| state.file_path.clone()) else {
        return Response::error(
            id,
            error_codes::INVALID_PARAMS,
            "No file path to save to".to_string(),
        );
    };

    let saved = project
        .save(&path)
        .with_context(|| format!("Failed to save project {}", path.display()));
    if let Err(e) = saved {
        return Response::error(id, error_codes::SAVE_FAILED, format!("{:#}", e));
    }

    state.file_path = Some(path.clone());
    state.modified = false;
    Response::success(id, serde_json::json!({ "status": "ok", "file_path": path }))
}

/// Handle Close request - drops the loaded project
pub fn handle_close(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    let had_changes = state.modified;
    state.close();
    info!("[Server] Project closed (unsaved changes dropped: {})", had_changes);
    Response::success(id, serde_json::json!({ "status": "ok", "discarded_changes": had_changes }))
}

#[derive(Debug, Serialize)]
pub struct LayerInfo {
    pub name: String,
    pub group: Option<String>,
    pub geometry_class: GeometryClass,
    pub feature_count: usize,
    pub fields: Vec<String>,
    pub selected: usize,
}

/// Handle GetLayers request - lists the layers of the loaded project
pub fn handle_get_layers(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    let project = match loaded_project(state, &id) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let layers: Vec<LayerInfo> = project
        .layers()
        .iter()
        .map(|l| LayerInfo {
            name: l.name.clone(),
            group: l.group.clone(),
            geometry_class: l.geometry_class,
            feature_count: l.len(),
            fields: l.schema.fields().to_vec(),
            selected: l.selection().len(),
        })
        .collect();
    Response::typed(id, &layers)
}

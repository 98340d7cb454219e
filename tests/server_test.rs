//! Request-level tests for the QA server

mod common;

use common::{pt, ProjectBuilder};
use serde_json::{json, Value};
use verif_infra::server::{dispatch, error_codes, Request, Response, ServerState};
use verif_infra::{Feature, GeometryClass};

fn call(state: &mut ServerState, method: &str, params: Option<Value>) -> Response {
    dispatch(
        state,
        Request {
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        },
    )
}

fn error_code(response: &Response) -> Option<i32> {
    response.error.as_ref().map(|e| e.code)
}

/// Saves a project with one phantom chamber and returns the loaded server
fn loaded_server(dir: &tempfile::TempDir) -> (ServerState, std::path::PathBuf) {
    let path = dir.path().join("zone.json");
    let project = ProjectBuilder::new()
        .layer(
            "Chambre",
            GeometryClass::Point,
            &["NOM"],
            vec![
                pt(0, 0.0, 0.0).with_attr("NOM", "CH1"),
                Feature::new(1, None).with_attr("NOM", "CH2"),
            ],
        )
        .build();
    project.save(&path).unwrap();

    let mut state = ServerState::new().unwrap();
    let response = call(&mut state, "Load", Some(json!({ "file_path": path })));
    assert!(!response.is_error(), "{:?}", response.error);
    (state, path)
}

#[test]
fn test_load_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = loaded_server(&dir);
    assert!(state.is_file_loaded());

    let layers = call(&mut state, "GetLayers", None);
    let result = layers.result.unwrap();
    assert_eq!(result[0]["name"], "Chambre");
    assert_eq!(result[0]["feature_count"], 2);
}

#[test]
fn test_run_check_selects_flagged_features() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = loaded_server(&dir);

    let response = call(
        &mut state,
        "RunCheck",
        Some(json!({ "check": "phantom_geometry" })),
    );
    assert!(!response.is_error(), "{:?}", response.error);

    let selection = call(&mut state, "GetSelection", Some(json!({ "layer": "Chambre" })));
    assert_eq!(selection.result.unwrap()["ids"], json!([1]));
}

#[test]
fn test_unknown_check_is_invalid_params() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = loaded_server(&dir);
    let response = call(&mut state, "RunCheck", Some(json!({ "check": "nope" })));
    assert_eq!(error_code(&response), Some(error_codes::INVALID_PARAMS));
}

#[test]
fn test_check_without_project() {
    let mut state = ServerState::new().unwrap();
    let response = call(&mut state, "RunAll", None);
    assert_eq!(error_code(&response), Some(error_codes::NO_PROJECT_LOADED));
}

#[test]
fn test_remediation_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = loaded_server(&dir);

    let response = call(&mut state, "RenameAll", Some(json!({ "zone": "ZR1" })));
    assert_eq!(error_code(&response), Some(error_codes::NOT_CONFIRMED));
    let response = call(&mut state, "DeletePhantoms", None);
    assert_eq!(error_code(&response), Some(error_codes::INVALID_PARAMS));
    assert!(!state.modified);
}

#[test]
fn test_delete_phantoms_then_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, path) = loaded_server(&dir);

    let response = call(&mut state, "DeletePhantoms", Some(json!({ "confirm": true })));
    assert!(!response.is_error(), "{:?}", response.error);
    assert_eq!(response.result.unwrap()["applied"]["Chambre"], 1);
    assert!(state.modified);

    let response = call(&mut state, "Save", None);
    assert!(!response.is_error(), "{:?}", response.error);
    assert!(!state.modified);

    let response = call(&mut state, "Load", Some(json!({ "file_path": path })));
    assert_eq!(response.result.unwrap()["feature_count"], 1);
}

#[test]
fn test_unknown_method() {
    let mut state = ServerState::new().unwrap();
    let response = call(&mut state, "Frobnicate", None);
    assert_eq!(error_code(&response), Some(error_codes::METHOD_NOT_FOUND));
}

#[test]
fn test_configure_rejects_bad_ratio() {
    let mut state = ServerState::new().unwrap();
    let response = call(
        &mut state,
        "Configure",
        Some(json!({ "overlap": { "total_ratio": 1.5 } })),
    );
    assert_eq!(error_code(&response), Some(error_codes::INVALID_CONFIG));
    assert_eq!(state.config.overlap.total_ratio, 0.99);
}

#[test]
fn test_configure_merges_partial_object() {
    let mut state = ServerState::new().unwrap();
    let response = call(
        &mut state,
        "Configure",
        Some(json!({ "snapping": { "tolerance": 0.5 } })),
    );
    assert!(!response.is_error(), "{:?}", response.error);
    assert_eq!(state.config.snapping.tolerance, 0.5);
    assert_eq!(state.config.snapping.trench_tolerance_factor, 2.0);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = ServerState::new().unwrap();
    let response = call(
        &mut state,
        "Load",
        Some(json!({ "file_path": dir.path().join("absent.json") })),
    );
    assert_eq!(error_code(&response), Some(error_codes::LOAD_FAILED));
    assert!(!state.is_file_loaded());
}

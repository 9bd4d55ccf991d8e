//! CLI E2E tests for the jt-core binary.
//!
//! Validates:
//! - `calibrate` prints every clique and sepset belief (text and JSON)
//! - `query` runs variable elimination with names, ids, and order hints
//! - `check` exits 0 on the student network and 1 when a check fails
//! - Model resolution honors `--model` and `JT_MODEL`
//! - Missing, unparsable, and structurally broken models map to the
//!   documented exit codes

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use jt_config::ModelFile;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

// ============================================================================
// Helpers
// ============================================================================

/// jt-core command isolated from the caller's model configuration.
fn jt_core(config_home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("jt-core");
    cmd.timeout(Duration::from_secs(60))
        .env_remove("JT_MODEL")
        .env_remove("JT_LOG")
        .env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("parse JSON")
}

fn write_model(dir: &TempDir, model: &ModelFile) -> PathBuf {
    let path = dir.path().join("model.json");
    fs::write(&path, model.to_json().unwrap()).unwrap();
    path
}

// ============================================================================
// Calibrate
// ============================================================================

#[test]
fn test_calibrate_text() {
    let home = tempdir().unwrap();
    jt_core(home.path())
        .arg("calibrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("joint from clique node"))
        .stdout(predicate::str::contains("sepset joint"))
        .stdout(predicate::str::contains("corresponding marginals:"))
        .stdout(predicate::str::contains("built-in student network"));
}

#[test]
fn test_calibrate_json_schema() {
    let home = tempdir().unwrap();
    let json = json_stdout(jt_core(home.path()).args(["--format", "json", "calibrate"]));

    assert_eq!(json["schema_version"], "1.0.0");
    assert_eq!(json["model"]["source"]["kind"], "builtin");
    assert_eq!(json["cliques"].as_array().unwrap().len(), 6);
    assert_eq!(json["sepsets"].as_array().unwrap().len(), 5);
    assert!(json["max_sepset_discrepancy"].as_f64().unwrap() < 1e-9);

    let first = &json["cliques"][0];
    assert_eq!(first["joint"]["variables"], serde_json::json!(["C", "D"]));
    let p_d0 = first["marginals"][1]["rows"][0]["p"].as_f64().unwrap();
    assert!((p_d0 - 0.6).abs() < 1e-12);
}

// ============================================================================
// Query
// ============================================================================

#[test]
fn test_query_by_name() {
    let home = tempdir().unwrap();
    let json = json_stdout(jt_core(home.path()).args(["--format", "json", "query", "--vars", "T"]));
    assert_eq!(json["variables"], serde_json::json!(["T"]));
    let p = json["joint"]["rows"][0]["p"].as_f64().unwrap();
    assert!((p - 0.7).abs() < 1e-12);
}

#[test]
fn test_query_with_order_and_normalize() {
    let home = tempdir().unwrap();
    let json = json_stdout(jt_core(home.path()).args([
        "--format",
        "json",
        "query",
        "--vars",
        "4,1",
        "--order",
        "I,C",
        "--normalize",
    ]));
    assert_eq!(json["variables"], serde_json::json!(["D", "G"]));
    assert_eq!(json["order"], serde_json::json!(["I", "C"]));
    assert_eq!(json["normalized"], true);
    let rows = json["joint"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    let sum: f64 = rows.iter().map(|r| r["p"].as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_query_unknown_variable_exit_code() {
    let home = tempdir().unwrap();
    jt_core(home.path())
        .args(["query", "--vars", "Z"])
        .assert()
        .code(12)
        .stderr(predicate::str::contains("unknown variable"));
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_default_success() {
    let home = tempdir().unwrap();
    let json = json_stdout(jt_core(home.path()).args(["--format", "json", "check"]));
    assert_eq!(json["status"], "ok");
    let checks = json["checks"].as_array().expect("checks should be array");
    assert_eq!(checks.len(), 10);
    for check in checks {
        assert_eq!(check["status"], "ok", "{check}");
    }
}

#[test]
fn test_check_failure_exit_code() {
    let home = tempdir().unwrap();
    jt_core(home.path())
        .args(["check", "--tolerance=-1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"));
}

// ============================================================================
// Model resolution and error paths
// ============================================================================

#[test]
fn test_model_from_env() {
    let home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let mut model = ModelFile::student();
    model.description = Some("from the environment".to_string());
    let path = write_model(&dir, &model);

    let json = json_stdout(
        jt_core(home.path())
            .env("JT_MODEL", &path)
            .args(["--format", "json", "calibrate"]),
    );
    assert_eq!(json["model"]["source"]["kind"], "env");
    assert_eq!(json["model"]["description"], "from the environment");
}

#[test]
fn test_model_from_config_dir() {
    let home = tempdir().unwrap();
    let dir = home.path().join("junction-tree");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("model.json"), ModelFile::student().to_json().unwrap()).unwrap();

    let json = json_stdout(jt_core(home.path()).args(["--format", "json", "check"]));
    assert_eq!(json["model"]["source"]["kind"], "xdg");
}

#[test]
fn test_missing_model_is_config_error() {
    let home = tempdir().unwrap();
    jt_core(home.path())
        .args(["--model", "/nonexistent/model.json", "calibrate"])
        .assert()
        .code(10);
}

#[test]
fn test_unparsable_model_is_config_error() {
    let home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, "{ not json").unwrap();
    let json = json_stdout(
        jt_core(home.path())
            .args(["--format", "json", "--model"])
            .arg(&path)
            .arg("calibrate"),
    );
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["exit_code"], 10);
}

#[test]
fn test_cyclic_tree_is_inference_error() {
    let home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let mut model = ModelFile::student();
    model.clique_tree.edges.push([0, 2]);
    let path = write_model(&dir, &model);

    let mut cmd = jt_core(home.path());
    cmd.args(["--format", "json", "--model"]).arg(&path).arg("calibrate");
    let output = cmd.assert().code(12).get_output().stdout.clone();
    let json: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["error"]["code"], 11);
    assert!(json["error"]["message"].as_str().unwrap().contains("cycle"));
}

// ============================================================================
// Schema and completions
// ============================================================================

#[test]
fn test_schema_lists_model_fields() {
    let home = tempdir().unwrap();
    let json = json_stdout(jt_core(home.path()).arg("schema"));
    let props = json["properties"].as_object().expect("properties");
    for field in ["variables", "cpds", "clique_tree", "alpha"] {
        assert!(props.contains_key(field), "missing {field}");
    }
}

#[test]
fn test_completions_bash() {
    let home = tempdir().unwrap();
    jt_core(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jt-core"));
}

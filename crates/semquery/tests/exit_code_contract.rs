use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 64;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn write_json(path: &Path, value: &Value) {
    let encoded = serde_json::to_string_pretty(value).expect("fixture should serialize");
    std::fs::write(path, encoded).expect("fixture should be writable");
}

/// Writes a catalog, a session and canned responses into a fresh directory.
fn workspace(prefix: &str) -> PathBuf {
    let temp = unique_temp_dir(prefix);
    std::fs::create_dir_all(&temp).expect("temp dir should be creatable");
    write_json(
        &temp.join("catalog.json"),
        &json!({
            "views": [{
                "name": "orders",
                "dimensions": [{"name": "status", "type": "string"}],
                "measures": [{"name": "total", "type": "sum"}]
            }]
        }),
    );
    write_json(
        &temp.join("session.json"),
        &json!([
            {"action": "toggle_dimension", "field": "orders.status"},
            {"action": "toggle_measure", "field": "orders.total"},
            {"action": "add_filter", "field": "orders.status"},
            {"action": "update_filter", "index": 0, "filter": {
                "field": "orders.status", "op": "eq", "value": "shipped"
            }},
            {"action": "add_order"},
            {"action": "update_order", "index": 0, "order": {
                "field": "orders.total", "direction": "desc"
            }},
            {"action": "toggle_measure", "field": "orders.missing"},
            {"action": "execute"}
        ]),
    );
    write_json(
        &temp.join("responses.json"),
        &json!({
            "compile": {"sql": "SELECT status, SUM(total) FROM orders"},
            "execute": [["shipped", "42"]]
        }),
    );
    temp
}

fn stdout_envelope(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should hold one JSON envelope")
}

#[test]
fn missing_required_args_exits_with_usage_code() {
    let status = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .arg("fields")
        .status()
        .expect("command should execute");

    assert_eq!(status.code(), Some(EXIT_USAGE_ERROR));
}

#[test]
fn help_exits_successfully() {
    let status = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .arg("--help")
        .status()
        .expect("command should execute");

    assert_eq!(status.code(), Some(EXIT_SUCCESS));
}

#[test]
fn runtime_path_resolution_failures_exit_with_runtime_code() {
    let temp = workspace("semquery-exit-runtime");
    let status = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .args(["--home-dir", "relative", "fields", "--view", "orders"])
        .arg("--catalog")
        .arg(temp.join("catalog.json"))
        .status()
        .expect("command should execute");

    assert_eq!(status.code(), Some(EXIT_RUNTIME_FAILURE));
}

#[test]
fn unknown_scope_prints_an_error_envelope() {
    let temp = workspace("semquery-exit-scope");
    let output = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .arg("--cwd")
        .arg(&temp)
        .args(["fields", "--catalog", "catalog.json", "--view", "invoices"])
        .output()
        .expect("command should execute");

    assert_eq!(output.status.code(), Some(EXIT_RUNTIME_FAILURE));
    let envelope = stdout_envelope(&output);
    assert_eq!(envelope.pointer("/status"), Some(&json!("error")));
    assert_eq!(
        envelope.pointer("/code"),
        Some(&json!("catalog_scope_not_found"))
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("view not found in catalog"));
}

#[test]
fn build_prints_the_request_and_rejections() {
    let temp = workspace("semquery-exit-build");
    let output = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .arg("--cwd")
        .arg(&temp)
        .args([
            "build",
            "--catalog",
            "catalog.json",
            "--view",
            "orders",
            "--session",
            "session.json",
        ])
        .output()
        .expect("command should execute");

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let envelope = stdout_envelope(&output);
    assert_eq!(
        envelope.pointer("/data/request"),
        Some(&json!({
            "dimensions": ["orders.status"],
            "measures": ["orders.total"],
            "filters": [{"field": "orders.status", "op": "eq", "value": "shipped"}],
            "orders": [{"field": "orders.total", "direction": "desc"}],
            "variables": {}
        }))
    );
    assert_eq!(envelope.pointer("/counts/rejected"), Some(&json!(1)));
    assert_eq!(
        envelope.pointer("/hints/0"),
        Some(&json!({
            "source": "action",
            "action_index": 6,
            "message": "`orders.missing` is not a measure in the catalog"
        }))
    );
}

#[test]
fn replay_runs_the_session_against_canned_responses() {
    let temp = workspace("semquery-exit-replay");
    let output = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .arg("--cwd")
        .arg(&temp)
        .args([
            "replay",
            "--catalog",
            "catalog.json",
            "--view",
            "orders",
            "--session",
            "session.json",
            "--responses",
            "responses.json",
        ])
        .output()
        .expect("command should execute");

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let envelope = stdout_envelope(&output);
    assert_eq!(envelope.pointer("/data/view_mode"), Some(&json!("results")));
    assert_eq!(
        envelope.pointer("/data/compile_state"),
        Some(&json!("compiled"))
    );
    assert_eq!(
        envelope.pointer("/data/execution/value"),
        Some(&json!([["shipped", "42"]]))
    );
    assert_eq!(envelope.pointer("/counts/compile_calls"), Some(&json!(6)));
    assert_eq!(envelope.pointer("/counts/execute_calls"), Some(&json!(1)));
}

#[test]
fn schema_prints_the_request_schema() {
    let output = Command::new(env!("CARGO_BIN_EXE_semquery"))
        .arg("schema")
        .output()
        .expect("command should execute");

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let envelope = stdout_envelope(&output);
    assert_eq!(envelope.pointer("/status"), Some(&json!("ok")));
    assert!(envelope.pointer("/data/properties/query").is_some());
}

use serde_json::Value;
use std::process::{Command, Output};

fn vlex(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vlex"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("VLEX_MODEL_API_KEY")
        .env_remove("KIMI_API_KEY")
        .env_remove("VLEX_SECONDARY_SOURCE_KEY")
        .env_remove("VLEX_SECONDARY_SOURCE_ID")
        .env("VLEX_PRIMARY_SOURCE_URL", "http://127.0.0.1:1")
        .env("VLEX_SOURCE_TIMEOUT_SECS", "1")
        .output()
        .expect("run vlex")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn resolve_prints_local_text() {
    let output = vlex(&["resolve", "John 1:1"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["provider"], "local_table");
    assert!(json["text"].as_str().unwrap().starts_with("Ἐν ἀρχῇ"));
    assert_eq!(json["reference"]["chapter"], 1);
}

#[test]
fn resolve_unknown_reference_exits_not_found() {
    let output = vlex(&["resolve", "Mark 99:1"]);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["status"], 404);
    assert_eq!(json["tried"], serde_json::json!(["local_table", "primary"]));
}

#[test]
fn resolve_bad_format_exits_not_found() {
    let output = vlex(&["resolve", "three sixteen"]);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["error"], "invalid_format");
    assert!(json["detail"].as_str().unwrap().contains("John 1:1"));
}

#[test]
fn normalize_reads_file_and_rejects_objects() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let good = dir.path().join("good.txt");
    std::fs::write(
        &good,
        "```json\n[{\"word\":\"λόγος\",\"strong\":\"G3056\",\"lemma\":\"λόγος\",\"translation\":\"word\",\"alternatives\":[\"word\",\"reason\"]}]\n```\n",
    )
    .unwrap();
    let output = vlex(&["normalize", "--file", good.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)[0]["word"], "λόγος");

    let bad = dir.path().join("bad.txt");
    std::fs::write(&bad, "{}").unwrap();
    let output = vlex(&["normalize", "--file", bad.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["error"], "malformed");
    assert_eq!(json["status"], 500);
}

#[test]
fn refs_lists_local_table() {
    let output = vlex(&["refs"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"John 1:1"));
    assert_eq!(lines.len(), 5);
}

#[test]
fn status_reports_configured_tiers() {
    let output = vlex(&["status"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["providers"], serde_json::json!(["local_table", "primary"]));
    assert_eq!(json["model_key_configured"], false);
}

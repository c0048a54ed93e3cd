#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ARTICLE: &str = "Ownership rules decide when memory is released. Each value has exactly one owner. \
    Borrowing lets code read data without taking ownership. Mutable borrows are exclusive for their lifetime. \
    The compiler checks these rules before the program runs. Violations become compile errors instead of crashes.";

fn sift() -> Command {
    let mut cmd = Command::cargo_bin("sift").unwrap();
    cmd.env_remove("SIFT_CONFIG").env("RUST_LOG", "warn");
    cmd
}

fn good_item(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Understanding ownership",
        "url": format!("https://example.com/{id}"),
        "sourceType": "document",
        "sourceName": "example.com",
        "content": ARTICLE,
        "metadata": { "view_count": 2_000_000 }
    })
}

fn bad_item(id: &str) -> Value {
    json!({ "id": id, "title": "", "url": "", "content": "" })
}

fn write_jsonl(dir: &Path, items: &[Value]) -> std::path::PathBuf {
    let path = dir.join("items.jsonl");
    let body: Vec<String> = items.iter().map(Value::to_string).collect();
    fs::write(&path, body.join("\n")).unwrap();
    path
}

#[test]
fn all_items_passing_exits_zero() {
    let dir = tempdir().unwrap();
    let input = write_jsonl(dir.path(), &[good_item("a"), good_item("b")]);

    let out = sift()
        .args(["validate", "--judge", "fake", "--input"])
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let results: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["metadata"]["item_id"], "a");
    assert_eq!(results[1]["metadata"]["item_id"], "b");
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn any_failing_item_exits_one() {
    let dir = tempdir().unwrap();
    let input = write_jsonl(dir.path(), &[good_item("a"), bad_item("b")]);

    sift()
        .args(["validate", "--judge", "fake", "--input"])
        .arg(&input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing required field(s): title, url"));
}

#[test]
fn summary_goes_to_stderr_and_results_to_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("items.json");
    fs::write(&input, json!([good_item("a"), bad_item("b")]).to_string()).unwrap();
    let output = dir.path().join("results.jsonl");

    sift()
        .args(["validate", "--judge", "fake", "--summary", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("\"total_checked\": 2"))
        .stderr(predicate::str::contains("\"short_circuited\": 1"));

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 2);
}

#[test]
fn no_semantic_never_reaches_the_judge() {
    let dir = tempdir().unwrap();
    let input = write_jsonl(dir.path(), &[good_item("a")]);

    // Automated 1.0 * 0.3 + authority 1.0 * 0.2 stays below 0.75.
    let out = sift()
        .args(["validate", "--no-semantic", "--input"])
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let result: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(result["metadata"]["layers"], json!(["automated"]));
    assert!((result["confidence"].as_f64().unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn invalid_config_exits_two() {
    let dir = tempdir().unwrap();
    let input = write_jsonl(dir.path(), &[good_item("a")]);
    let config = dir.path().join("sift.yaml");
    fs::write(
        &config,
        "version: 1\nweights:\n  automated: 0.9\n  semantic: 0.9\n  source_authority: 0.2\n",
    )
    .unwrap();

    sift()
        .args(["validate", "--judge", "fake", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sum to at most 1.0"));
}

#[test]
fn unparseable_input_exits_two_with_line_number() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("items.jsonl");
    fs::write(&input, format!("{}\n{{not json\n", good_item("a"))).unwrap();

    sift()
        .args(["validate", "--judge", "fake", "--input"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn missing_input_file_exits_two() {
    sift()
        .args(["validate", "--judge", "fake", "--input", "/nonexistent/items.jsonl"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reading items"));
}

#[test]
fn config_prints_effective_yaml() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("sift.yaml");
    fs::write(&config, "version: 1\nthresholds:\n  min_confidence: 0.6\n").unwrap();

    sift()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("min_confidence: 0.75"))
        .stdout(predicate::str::contains("short_circuit_below: 0.3"));

    sift()
        .args(["config", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("min_confidence: 0.6"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("sift.yaml");
    fs::write(&config, "version: 1\nthreshold: {}\n").unwrap();

    sift()
        .args(["config", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config error"));
}

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn walter() -> Command {
    Command::cargo_bin("walter").unwrap()
}

fn write_rows(dir: &TempDir) -> std::path::PathBuf {
    let rows = serde_json::json!([
        {
            "timestamp": "2025-03-01 10:00:00",
            "type": "Trade",
            "inflow_amount": "10",
            "inflow_currency": "SOL",
            "outflow_amount": "1500",
            "outflow_currency": "USDC",
            "market": "Jupiter",
            "note": "",
            "signer": "4fYNw3dojWmQ4dXtSGE9epjRGy9pFSx62YypT7avPYvp",
            "signature": "5h2mVgRrvTSKFJ9XfUxQqP3B8eWb1NcZk4dDYJ7oLpAuE6tGHsyn9wmRKxCa2jzfM8qULVDpeB4NSkThbrW1cXyo"
        },
        {
            "timestamp": "2025-03-02 11:00:00",
            "type": "Trade",
            "inflow_amount": "500",
            "inflow_currency": "SPL-7xKq",
            "outflow_amount": "5",
            "outflow_currency": "SOL",
            "market": "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4",
            "note": "",
            "signer": "4fYNw3dojWmQ4dXtSGE9epjRGy9pFSx62YypT7avPYvp"
        }
    ]);
    let path = dir.path().join("rows.json");
    std::fs::write(&path, serde_json::to_string_pretty(&rows).unwrap()).unwrap();
    path
}

#[test]
fn issues_lists_pending_placeholder_and_market() {
    let dir = TempDir::new().unwrap();
    let rows = write_rows(&dir);
    let store = dir.path().join("store.json");

    walter()
        .args(["issues", rows.to_str().unwrap(), "--store", store.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("SPL-7xKq"))
        .stdout(predicate::str::contains("pending issue(s) block export"));
}

#[test]
fn export_refuses_while_issues_pending() {
    let dir = TempDir::new().unwrap();
    let rows = write_rows(&dir);
    let store = dir.path().join("store.json");
    let out = dir.path().join("out.csv");

    walter()
        .args([
            "export",
            rows.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--store",
            store.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pending issue(s) remain"));
    assert!(!out.exists());
}

#[test]
fn rename_then_export_succeeds_with_overrides_applied() {
    let dir = TempDir::new().unwrap();
    let rows = write_rows(&dir);
    let store = dir.path().join("store.json");
    let out = dir.path().join("out.csv");

    walter()
        .args([
            "issues", rows.to_str().unwrap(),
            "--store", store.to_str().unwrap(),
            "rename", "token", "SPL-7xKq", "wif",
        ])
        .assert()
        .success();
    walter()
        .args([
            "issues", rows.to_str().unwrap(),
            "--store", store.to_str().unwrap(),
            "ignore", "market", "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4",
        ])
        .assert()
        .success();

    walter()
        .args([
            "export",
            rows.to_str().unwrap(),
            "--output", out.to_str().unwrap(),
            "--store", store.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 row(s)"));

    let csv = std::fs::read_to_string(&out).unwrap();
    // token rename is uppercased; ignored market keeps its raw address
    assert!(csv.contains("WIF"));
    assert!(csv.contains("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"));
}

#[test]
fn export_force_bypasses_gate() {
    let dir = TempDir::new().unwrap();
    let rows = write_rows(&dir);
    let store = dir.path().join("store.json");
    let out = dir.path().join("out.csv");

    walter()
        .args([
            "export",
            rows.to_str().unwrap(),
            "--output", out.to_str().unwrap(),
            "--force",
            "--store", store.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn summary_reports_per_currency_totals() {
    let dir = TempDir::new().unwrap();
    let rows = write_rows(&dir);
    let store = dir.path().join("store.json");

    walter()
        .args(["summary", rows.to_str().unwrap(), "--store", store.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("SOL"))
        .stdout(predicate::str::contains("Trade (buy)"));
}

#[test]
fn demo_writes_loadable_rows() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("demo.json");
    let store = dir.path().join("store.json");

    walter()
        .args(["demo", out.to_str().unwrap(), "--count", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25 sample row(s)"));

    // the generated file round-trips through every read-only command
    walter()
        .args(["summary", out.to_str().unwrap(), "--store", store.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn rejects_malformed_row_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

    walter()
        .args(["issues", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a JSON array"));
}

#[test]
fn unknown_issue_kind_is_an_error() {
    let dir = TempDir::new().unwrap();
    let rows = write_rows(&dir);
    let store = dir.path().join("store.json");

    walter()
        .args([
            "issues", rows.to_str().unwrap(),
            "--store", store.to_str().unwrap(),
            "rename", "wallet", "x", "y",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown issue kind"));
}

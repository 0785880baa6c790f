//! CLI integration tests
//!
//! Drive the built binary end to end against a scratch database.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ADMIN_KEY: &str = "cli-admin-key";

fn cli(db: &Path, api_key: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmdgate-cli"));
    cmd.arg("--db")
        .arg(db)
        .args(["--log-profile", "test"])
        .env_remove("CMDGATE_API_KEY")
        .env_remove("CMDGATE_ADMIN_API_KEY")
        .env_remove("CMDGATE_CONFIG")
        .args(args);
    if let Some(key) = api_key {
        cmd.env("CMDGATE_API_KEY", key);
    }
    cmd.output().expect("Failed to execute CLI")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}\nstderr: {}",
            e,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn init_db(temp_dir: &TempDir) -> PathBuf {
    let db = temp_dir.path().join("gateway.db");
    let output = cli(&db, None, &["init", "--admin-api-key", ADMIN_KEY]);
    assert!(output.status.success(), "init failed: {:?}", output);
    db
}

fn create_member(db: &Path, name: &str, credits: &str) -> String {
    let output = cli(
        db,
        Some(ADMIN_KEY),
        &["principal", "create", "--name", name, "--credits", credits],
    );
    assert!(output.status.success(), "principal create failed: {:?}", output);
    stdout_json(&output)["api_key"]
        .as_str()
        .expect("api_key in output")
        .to_string()
}

#[test]
fn test_init_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db = init_db(&temp_dir);

    let output = cli(&db, None, &["init", "--admin-api-key", ADMIN_KEY]);
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["admin_created"], false);
    assert_eq!(report["rules_seeded"], 0);
    assert!(report["admin_api_key"].is_null());
}

#[test]
fn test_init_without_key_prints_generated_key_once() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("gateway.db");

    let first = stdout_json(&cli(&db, None, &["init"]));
    let key = first["admin_api_key"].as_str().expect("generated key").to_string();

    let second = stdout_json(&cli(&db, None, &["init"]));
    assert!(second["admin_api_key"].is_null());

    let output = cli(&db, Some(key.as_str()), &["credits"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["credits"], 9999);
}

#[test]
fn test_submit_executes_and_debits() {
    let temp_dir = TempDir::new().unwrap();
    let db = init_db(&temp_dir);
    let key = create_member(&db, "alice", "5");

    let output = cli(&db, Some(key.as_str()), &["submit", "ls -la"]);
    assert!(output.status.success(), "{:?}", output);
    let record = stdout_json(&output);
    assert_eq!(record["status"], "executed");
    assert_eq!(record["result"], "[MOCK] Would execute: ls -la");

    let credits = stdout_json(&cli(&db, Some(key.as_str()), &["credits"]));
    assert_eq!(credits["credits"], 4);

    let history = stdout_json(&cli(&db, Some(key.as_str()), &["history"]));
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_default_rule_rejects_destructive_command() {
    let temp_dir = TempDir::new().unwrap();
    let db = init_db(&temp_dir);
    let key = create_member(&db, "alice", "1");

    let output = cli(&db, Some(key.as_str()), &["submit", "rm -rf /"]);

    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["status"], "rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_POLICY_REJECTED"), "stderr: {}", stderr);

    let credits = stdout_json(&cli(&db, Some(key.as_str()), &["credits"]));
    assert_eq!(credits["credits"], 1);
}

#[test]
fn test_missing_api_key_is_unauthenticated() {
    let temp_dir = TempDir::new().unwrap();
    let db = init_db(&temp_dir);

    let output = cli(&db, None, &["submit", "pwd"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_UNAUTHENTICATED"), "stderr: {}", stderr);
}

#[test]
fn test_rule_add_requires_admin_and_valid_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let db = init_db(&temp_dir);
    let key = create_member(&db, "bob", "10");

    let output = cli(
        &db,
        Some(key.as_str()),
        &["rule", "add", "--pattern", "shutdown", "--action", "auto-reject"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_FORBIDDEN"));

    let output = cli(
        &db,
        Some(ADMIN_KEY),
        &["rule", "add", "--pattern", "(", "--action", "auto-reject"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_PATTERN"));

    let output = cli(
        &db,
        Some(ADMIN_KEY),
        &["rule", "add", "--pattern", "shutdown", "--action", "auto-reject"],
    );
    assert!(output.status.success(), "{:?}", output);

    let output = cli(&db, None, &["rule", "list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_UNAUTHENTICATED"), "stderr: {}", stderr);

    let rules = stdout_json(&cli(&db, Some(key.as_str()), &["rule", "list"]));
    let patterns: Vec<&str> = rules
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["pattern"].as_str())
        .collect();
    assert_eq!(patterns.last(), Some(&"shutdown"));

    let output = cli(&db, Some(key.as_str()), &["submit", "shutdown -h now"]);
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["status"], "rejected");
}

#[test]
fn test_audit_is_admin_only() {
    let temp_dir = TempDir::new().unwrap();
    let db = init_db(&temp_dir);
    let key = create_member(&db, "carol", "2");
    cli(&db, Some(key.as_str()), &["submit", "pwd"]);

    let output = cli(&db, Some(key.as_str()), &["audit"]);
    assert!(!output.status.success());

    let output = cli(&db, Some(ADMIN_KEY), &["audit", "--limit", "1"]);
    assert!(output.status.success());
    let entries = stdout_json(&output);
    assert_eq!(entries.as_array().map(Vec::len), Some(1));
    assert_eq!(entries[0]["action"], "command_executed");
}

#[test]
fn test_config_file_supplies_db_path() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("from-config.db");
    let config = temp_dir.path().join("cmdgate.toml");
    std::fs::write(
        &config,
        format!("db_path = {:?}\nlog_profile = \"test\"\n", db.to_str().unwrap()),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cmdgate-cli"))
        .env_remove("CMDGATE_DB")
        .args(["--config", config.to_str().unwrap(), "init"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert!(db.exists());
}

//! Basic CLI E2E tests.
//!
//! Each test runs the binary via cargo run against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "studydash-cli", "--"])
        .args(args)
        .env("STUDYDASH_DATA_DIR", data_dir)
        .env("STUDYDASH_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn init_profile(data_dir: &Path) {
    let (code, stdout, _) = run_cli(
        data_dir,
        &["profile", "init", "--name", "Asha", "--email", "asha@example.com", "--id", "u1"],
    );
    assert_eq!(code, 0, "profile init failed");
    assert!(stdout.contains("\"id\": \"u1\""));
}

#[test]
fn test_commands_need_a_profile() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["goal", "get"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("profile init"));
}

#[test]
fn test_profile_show() {
    let dir = tempfile::tempdir().unwrap();
    init_profile(dir.path());
    let (code, stdout, _) = run_cli(dir.path(), &["profile", "show"]);
    assert_eq!(code, 0);
    let profile: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(profile["name"], "Asha");
    assert_eq!(profile["credits"], 0);
}

#[test]
fn test_goal_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    init_profile(dir.path());

    let (code, stdout, _) = run_cli(dir.path(), &["goal", "get"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("10800"));

    let (code, _, _) = run_cli(dir.path(), &["goal", "set", "--minutes", "45"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["goal", "get"]);
    assert!(stdout.starts_with("2700 (0h 45m)"));

    let (code, _, _) = run_cli(dir.path(), &["goal", "set", "--hours", "13"]);
    assert_ne!(code, 0, "goals over twelve hours are rejected");
}

#[test]
fn test_reward_claim_once() {
    let dir = tempfile::tempdir().unwrap();
    init_profile(dir.path());
    run_cli(dir.path(), &["goal", "set", "--minutes", "30"]);

    let (_, stdout, _) = run_cli(dir.path(), &["reward", "claim"]);
    assert!(stdout.contains("nothing to claim"));

    let (code, _, _) = run_cli(dir.path(), &["activity", "record", "1800"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["reward", "status"]);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["eligible"], true);

    let (code, stdout, _) = run_cli(dir.path(), &["reward", "claim"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Received: 3 Free Credits!"));

    let (_, stdout, _) = run_cli(dir.path(), &["reward", "claim"]);
    assert!(stdout.contains("nothing to claim"));
}

#[test]
fn test_reward_check_takes_rfc3339_dates() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        dir.path(),
        &["reward", "check", "--seconds", "10800", "--goal", "10800", "--last-claim", "2020-01-01T08:00:00Z"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "true");

    let (_, stdout, _) = run_cli(dir.path(), &["reward", "check", "--seconds", "10799", "--goal", "10800"]);
    assert_eq!(stdout.trim(), "false");

    let (_, stdout, _) = run_cli(
        dir.path(),
        &["reward", "check", "--seconds", "60", "--goal", "60", "--last-claim", "not a date"],
    );
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_activity_show() {
    let dir = tempfile::tempdir().unwrap();
    init_profile(dir.path());
    run_cli(dir.path(), &["activity", "record", "5400"]);
    let (code, stdout, _) = run_cli(dir.path(), &["activity", "show"]);
    assert_eq!(code, 0);
    let progress: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(progress["seconds_today"], 5400);
    assert_eq!(progress["progress_pct"], 50.0);
    assert_eq!(progress["studied"], "1h 30m");
}

#[test]
fn test_inbox_read_empty() {
    let dir = tempfile::tempdir().unwrap();
    init_profile(dir.path());
    let (code, stdout, _) = run_cli(dir.path(), &["inbox", "read"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no unread messages"));
}

#[test]
fn test_config_set_get() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "rewards.ultra", "25"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "rewards.ultra"]);
    assert_eq!(stdout.trim(), "25");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "rewards.nope"]);
    assert_ne!(code, 0);

    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "goal.default_hours", "20"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("goal.default_hours"));
    let (code, _, _) = run_cli(
        dir.path(),
        &["config", "set", "first_day_bonus.grant_minutes", "9223372036854775807"],
    );
    assert_ne!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "goal.default_hours"]);
    assert_eq!(stdout.trim(), "3");

    run_cli(dir.path(), &["config", "reset"]);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "rewards.ultra"]);
    assert_eq!(stdout.trim(), "20");
}

#[test]
fn test_session_run_persists_ticks() {
    let dir = tempfile::tempdir().unwrap();
    init_profile(dir.path());
    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &["session", "run", "--ticks", "2", "--study-per-tick", "600", "--interval-secs", "1"],
    );
    assert_eq!(code, 0, "session run failed: {stderr}");
    assert_eq!(stdout.matches("\"type\":\"TickPersisted\"").count(), 2);

    let (_, stdout, _) = run_cli(dir.path(), &["activity", "show"]);
    let progress: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(progress["seconds_today"], 1200);
}

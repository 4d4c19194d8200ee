//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomogacha-cli"))
        .args(args)
        .env("POMOGACHA_HOME", home)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, expect success, and parse stdout as JSON.
fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_course_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let events = run_json(home, &["course", "start", "-n", "3", "--focus", "25", "--break", "5"]);
    assert_eq!(events[0]["type"], "course_created");
    assert_eq!(events[1]["type"], "focus_started");
    assert_eq!(events[1]["duration_ms"], 1_500_000);

    let status = run_json(home, &["course", "status"]);
    assert_eq!(status["phase"], "focusing");
    assert_eq!(status["course"]["plannedSessions"], 3);

    for n in 1..=3 {
        let outcome = run_json(home, &["course", "complete"]);
        assert!(outcome["draw"]["item"]["id"].is_string());
        assert_eq!(outcome["session"]["outcome"], "recorded");
        assert_eq!(outcome["session"]["completedSessions"], n);
    }
    let status = run_json(home, &["course", "status"]);
    assert_eq!(status["phase"], "finished");
    assert_eq!(status["remainingSessions"], 0);

    // A finished course takes no more focus sessions.
    let (_, _, code) = run_cli(home, &["course", "complete"]);
    assert_ne!(code, 0);

    let summary = run_json(home, &["course", "end"]);
    assert_eq!(summary["finished"], true);
    assert_eq!(summary["items"].as_array().unwrap().len(), 3);

    let (_, stderr, code) = run_cli(home, &["course", "end"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("no current course"));

    let history = run_json(home, &["course", "history"]);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(run_json(home, &["course", "summary"]), history[0]);

    let collection = run_json(home, &["collection", "list"]);
    let total: u64 = collection
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 3);
}

#[test]
fn test_complete_without_course_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["course", "complete"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_settings_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let shown = run_json(home, &["settings", "show"]);
    assert_eq!(shown["defaultFocusMs"], 1_500_000);

    let updated = run_json(home, &["settings", "set", "--focus", "50", "--sound", "false"]);
    assert_eq!(updated["defaultFocusMs"], 3_000_000);
    assert_eq!(updated["sound"], false);
    assert_eq!(updated["defaultBreakMs"], 300_000);

    let events = run_json(home, &["course", "start", "-n", "1"]);
    assert_eq!(events[1]["duration_ms"], 3_000_000);

    let no_break = run_json(home, &["settings", "set", "--break", "0"]);
    assert_eq!(no_break["defaultBreakMs"], 0);

    let reset = run_json(home, &["settings", "reset"]);
    assert_eq!(reset["defaultFocusMs"], 1_500_000);
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let (stdout, _, code) = run_cli(home, &["config", "get", "timer.tick_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1000");

    let (_, _, code) = run_cli(home, &["config", "set", "reward.seed", "7"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home, &["config", "get", "reward.seed"]);
    assert_eq!(stdout.trim(), "7");

    let (_, _, code) = run_cli(home, &["config", "set", "timer.tick_ms", "0"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(home, &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);

    let listed = run_json(home, &["config", "list"]);
    assert_eq!(listed["reward"]["weights"]["ULTRA_RARE"], 0.5);

    let (stdout, _, code) = run_cli(home, &["config", "path"]);
    assert_eq!(code, 0);
    assert!(Path::new(stdout.trim()).starts_with(home));

    let reset = run_json(home, &["config", "reset"]);
    assert!(reset["reward"]["seed"].is_null());
}

#[test]
fn test_reward_draw_is_reproducible_with_seed() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let first = run_json(home, &["reward", "draw", "-n", "5", "--seed", "11"]);
    let second = run_json(home, &["reward", "draw", "-n", "5", "--seed", "11"]);
    assert_eq!(first.as_array().unwrap().len(), 5);
    assert_eq!(first, second);

    let odds = run_json(home, &["reward", "odds"]);
    let total: f64 = odds
        .as_array()
        .unwrap()
        .iter()
        .map(|tier| tier["chance"].as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-9);

    // Drawing previews nothing into the collection.
    assert!(run_json(home, &["collection", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn test_snapshot_recovery_rewards_elapsed_focus() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    run_json(home, &["course", "start", "-n", "2"]);
    let saved = run_json(home, &["snapshot", "save", "focus", "0"]);
    assert_eq!(saved["mode"], "FOCUS");
    assert!(run_json(home, &["snapshot", "show"]).is_object());

    let report = run_json(home, &["snapshot", "recover"]);
    assert_eq!(report["reconciliation"]["action"], "elapsed");
    assert!(report["reward"]["draw"].is_object());
    assert_eq!(report["phase"], "rewarded");

    assert!(run_json(home, &["snapshot", "show"]).is_null());
    let status = run_json(home, &["course", "status"]);
    assert_eq!(status["course"]["completedSessions"], 1);
}

#[test]
fn test_collection_views() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path();

    let all = run_json(home, &["collection", "list", "--all"]);
    assert_eq!(all.as_array().unwrap().len(), 13);

    run_json(home, &["course", "start", "-n", "1"]);
    let outcome = run_json(home, &["course", "complete"]);
    let id = outcome["draw"]["item"]["id"].as_str().unwrap().to_string();

    let shown = run_json(home, &["collection", "show", &id]);
    assert_eq!(shown["item"]["id"], id.as_str());
    assert_eq!(shown["acquiredAt"].as_array().unwrap().len(), 1);

    let calendar = run_json(home, &["collection", "calendar"]);
    assert_eq!(calendar.as_object().unwrap().len(), 1);

    let (_, _, code) = run_cli(home, &["collection", "clear"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(home, &["collection", "clear", "--yes"]);
    assert_eq!(code, 0);
    assert!(run_json(home, &["collection", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pomogacha-cli"));
}

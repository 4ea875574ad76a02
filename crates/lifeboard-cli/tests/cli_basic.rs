//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify exit codes.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "lifeboard-cli", "--"])
        .args(args)
        .env("LIFEBOARD_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("habit"));
}

#[test]
fn test_habit_help() {
    let (stdout, _, code) = run_cli(&["habit", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("complete"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let (_, _, code) = run_cli(&["pomodoro"]);
    assert_ne!(code, 0);
}

#[test]
fn test_habit_add_requires_start_date_with_interval() {
    let (_, stderr, code) = run_cli(&["habit", "add", "Water plants", "--interval", "3"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("start-date") || stderr.contains("start_date"));
}

#[test]
fn test_config_show_outputs_json() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("config show should print JSON");
    assert!(parsed.get("streak").is_some());
}

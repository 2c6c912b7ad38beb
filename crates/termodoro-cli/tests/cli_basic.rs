//! Basic CLI E2E tests.
//!
//! Each test points HOME at a fresh temporary directory so the config file
//! is created from defaults.

use std::io::Write;
use std::process::{Command, Stdio};

fn cli(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_termodoro-cli"));
    cmd.env("HOME", home).env_remove("TERMODORO_ENV").env_remove("RUST_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &std::path::Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(home).args(args).output().expect("failed to run CLI");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run `termodoro-cli run` feeding `input` on stdin.
fn run_interactive(home: &std::path::Path, args: &[&str], input: &str) -> (String, i32) {
    let mut child = cli(home)
        .arg("run")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.work_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1500");
    assert!(home.path().join(".config/termodoro/config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "timer.work_duration", "600"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.work_duration"]);
    assert_eq!(stdout.trim(), "600");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["speed"]["presets"], serde_json::json!([1, 60]));
}

#[test]
fn test_plan_uses_configured_cadence() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "timer.pomodoros_until_long_break", "2"]);
    let (stdout, _, code) = run_cli(home.path(), &["plan", "--count", "4", "--json"]);
    assert_eq!(code, 0);
    let steps: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let modes: Vec<&str> = steps
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["mode"].as_str().unwrap())
        .collect();
    assert_eq!(modes, vec!["shortBreak", "work", "longBreak", "work"]);
}

#[test]
fn test_run_toggle_then_quit() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, code) = run_interactive(home.path(), &[], "f\nq\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("[main] WORK 25:00 paused"));
    assert!(stdout.contains("[main] WORK 25:00 running"));
}

#[test]
fn test_run_with_popout() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, code) = run_interactive(home.path(), &["--popout"], "s\nq\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("[main] popout open"));
    assert!(stdout.contains("[main] SHORT BREAK 05:00"));
}

#[test]
fn test_run_exits_on_end_of_input() {
    let home = tempfile::tempdir().unwrap();
    let (_, code) = run_interactive(home.path(), &[], "");
    assert_eq!(code, 0);
}

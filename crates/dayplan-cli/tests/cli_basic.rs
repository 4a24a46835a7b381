//! Basic CLI E2E tests.
//!
//! Tests invoke the CLI binary against a sample plan file and verify outputs.
//! `HOME` points at a temporary directory so configuration stays isolated.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const PLAN: &str = r#"
[[blocks]]
id = "prep"
title = "Preparation"
start_time = "09:00"
end_time = "10:00"

[[blocks]]
id = "photos"
title = "Photoshoot"
start_time = "10:30"
end_time = "11:00"

[[sub_blocks]]
id = "vows"
parent_id = "prep"
title = "Vows"
offset_minutes = 10
duration_minutes = 20

[[sub_blocks]]
id = "toast"
parent_id = "prep"
title = "Toast"
offset_minutes = 50
duration_minutes = 20
"#;

struct Env {
    home: TempDir,
    plan: PathBuf,
}

fn setup() -> Env {
    let home = tempfile::tempdir().expect("Failed to create temp dir");
    let plan = home.path().join("plan.toml");
    std::fs::write(&plan, PLAN).expect("Failed to write plan");
    Env { home, plan }
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_dayplan-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("DAYPLAN_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

impl Env {
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        run_cli(self.home.path(), args)
    }

    fn plan(&self) -> &str {
        self.plan.to_str().unwrap()
    }
}

#[test]
fn test_plan_text() {
    let env = setup();
    let (stdout, _, code) = env.run(&["plan", env.plan()]);
    assert_eq!(code, 0, "plan failed");
    assert!(stdout.contains("Preparation"));
    assert!(stdout.contains("gap 10:00-10:30"));
    assert!(stdout.contains("markers: 09:00"));
}

#[test]
fn test_plan_json() {
    let env = setup();
    let (stdout, _, code) = env.run(&["plan", env.plan(), "--json"]);
    assert_eq!(code, 0, "plan --json failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["entries"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["gaps"][0]["gap"]["start"], 600);
    assert_eq!(parsed["gaps"][0]["gap"]["end"], 630);
}

#[test]
fn test_gaps() {
    let env = setup();
    let (stdout, _, code) = env.run(&["gaps", env.plan()]);
    assert_eq!(code, 0, "gaps failed");
    assert!(stdout.contains("10:00-10:30"));
    assert!(stdout.contains("medium"));
}

#[test]
fn test_check_reports_conflict() {
    let env = setup();
    let (_, stderr, code) = env.run(&["check", env.plan(), "--start", "09:30", "--end", "09:45"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("prep"));
}

#[test]
fn test_check_free_slot() {
    let env = setup();
    let (stdout, _, code) = env.run(&["check", env.plan(), "--start", "10:00", "--end", "10:30"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("ok"));
}

#[test]
fn test_check_excludes_edited_block() {
    let env = setup();
    let (_, _, code) = env.run(&[
        "check", env.plan(), "--start", "09:30", "--end", "10:15", "--exclude", "prep",
    ]);
    assert_eq!(code, 0);
}

#[test]
fn test_check_rejects_bad_input() {
    let env = setup();
    let (_, _, code) = env.run(&["check", env.plan(), "--start", "11:00", "--end", "10:00"]);
    assert_eq!(code, 1, "reversed range accepted");
    let (_, _, code) = env.run(&["check", env.plan(), "--start", "25:00", "--end", "26:00"]);
    assert_eq!(code, 1, "invalid time accepted");
}

#[test]
fn test_suggest() {
    let env = setup();
    let (stdout, _, code) = env.run(&["suggest", env.plan()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("11:30-13:30 (day 0)"));
}

#[test]
fn test_sub_timeline_with_overflow_warning() {
    let env = setup();
    let (stdout, stderr, code) = env.run(&["sub", env.plan(), "prep"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Vows"));
    assert!(stdout.contains("09:10"));
    assert!(stdout.contains("next offset: +70"));
    assert!(stderr.contains("warning: 'toast' runs 10min past"));
}

#[test]
fn test_sub_json_gaps_follow_config() {
    let env = setup();
    let (_, _, code) = env.run(&["config", "set", "gaps.min_gap_minutes", "25"]);
    assert_eq!(code, 0);

    // the 20 minute gap between vows and toast is now below the threshold
    let (stdout, _, code) = env.run(&["sub", env.plan(), "prep", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["gaps"].as_array().unwrap().len(), 0);
    assert_eq!(parsed["layout"]["gaps"].as_array().unwrap().len(), 0);

    let (_, _, code) = env.run(&["config", "set", "gaps.min_gap_minutes", "5"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = env.run(&["sub", env.plan(), "prep", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["gaps"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["layout"]["gaps"][0]["gap"], parsed["gaps"][0]);
}

#[test]
fn test_sub_unknown_block() {
    let env = setup();
    let (_, stderr, code) = env.run(&["sub", env.plan(), "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nope"));
}

#[test]
fn test_missing_plan_file() {
    let env = setup();
    let missing = env.home.path().join("missing.toml");
    let (_, stderr, code) = env.run(&["plan", missing.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_config_get_set() {
    let env = setup();
    let (stdout, _, code) = env.run(&["config", "get", "gaps.min_gap_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "15");

    let (_, _, code) = env.run(&["config", "set", "gaps.min_gap_minutes", "45"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = env.run(&["config", "get", "gaps.min_gap_minutes"]);
    assert_eq!(stdout.trim(), "45");

    // the 30 minute gap is now below the threshold
    let (stdout, _, code) = env.run(&["gaps", env.plan()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No gaps."));

    let (_, _, code) = env.run(&["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = env.run(&["config", "get", "gaps.min_gap_minutes"]);
    assert_eq!(stdout.trim(), "15");
}

#[test]
fn test_config_rejects_unknown_key() {
    let env = setup();
    let (_, _, code) = env.run(&["config", "get", "nope"]);
    assert_eq!(code, 1);
    let (_, _, code) = env.run(&["config", "set", "batch.batch_size", "many"]);
    assert_eq!(code, 1);
    let (_, stderr, code) = env.run(&["config", "set", "layout.min_block_height_px", "-10"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("layout.min_block_height_px"));
    let (stdout, _, _) = env.run(&["config", "get", "layout.min_block_height_px"]);
    assert_eq!(stdout.trim(), "40.0");
}

#[test]
fn test_config_list_and_path() {
    let env = setup();
    let (stdout, _, code) = env.run(&["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("batch.batch_size = 50"));

    let (stdout, _, code) = env.run(&["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/dayplan/config.toml"));
}

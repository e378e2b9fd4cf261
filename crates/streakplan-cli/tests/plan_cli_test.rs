//! Integration tests for the `streakplan` binary.
//!
//! These run without PostgreSQL or network access: `plan --dry-run` seeds
//! into memory and no API key is configured, so plans come from templates.

use std::path::Path;
use std::process::{Command, Output};

use chrono::{Duration, Utc};
use serde_json::Value;

fn streakplan(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_streakplan"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("STREAKPLAN_API_KEY")
        .env_remove("STREAKPLAN_DATABASE_URL")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run streakplan binary")
}

fn date_in(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

#[test]
fn dry_run_prints_fallback_schedule_as_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let deadline = date_in(13);
    let out = streakplan(
        tmp.path(),
        &[
            "plan",
            "--title",
            "Learn Spanish",
            "--deadline",
            &deadline,
            "--experience",
            "intermediate",
            "--dry-run",
            "--json",
        ],
    );
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let json: Value = serde_json::from_slice(&out.stdout).expect("stdout should be JSON");
    let summary = &json["summary"];
    assert_eq!(summary["source"], "fallback");
    assert_eq!(summary["attempts"], 0);

    let days = summary["total_days"].as_u64().unwrap();
    assert!((13..=14).contains(&days), "unexpected day count {days}");
    let streaks = summary["streak_count"].as_u64().unwrap();
    assert!(streaks >= 1);

    let tasks = json["tasks"].as_array().unwrap();
    let streak_rows = tasks.iter().filter(|t| t["task_type"] == "streak").count() as u64;
    let today_rows = tasks.iter().filter(|t| t["task_type"] == "today").count() as u64;
    assert_eq!(streak_rows, streaks * days);
    assert_eq!(today_rows, summary["total_today_tasks"].as_u64().unwrap());
    assert!(
        tasks
            .iter()
            .any(|t| t["scheduled_date"] == deadline.as_str()
                && t["title"].as_str().unwrap().starts_with("Complete")),
        "deadline should carry the completion milestone"
    );
}

#[test]
fn dry_run_table_lists_every_date() {
    let tmp = tempfile::TempDir::new().unwrap();
    let deadline = date_in(3);
    let out = streakplan(
        tmp.path(),
        &["plan", "--title", "Bench press 100kg", "--deadline", &deadline, "--dry-run"],
    );
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Goal planned."));
    assert!(stdout.contains("fallback"));
    assert!(stdout.contains(&deadline));
}

#[test]
fn past_deadline_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = streakplan(
        tmp.path(),
        &["plan", "--title", "Too late", "--deadline", &date_in(-3), "--dry-run"],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("before"), "stderr: {stderr}");
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let tmp = tempfile::TempDir::new().unwrap();

    let first = streakplan(tmp.path(), &["init", "--db-url", "postgresql://h:5432/plans"]);
    assert!(first.status.success());
    let written = std::fs::read_to_string(tmp.path().join("streakplan/config.toml")).unwrap();
    assert!(written.contains("postgresql://h:5432/plans"));

    let second = streakplan(tmp.path(), &["init"]);
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("--force"));

    let forced = streakplan(tmp.path(), &["init", "--force"]);
    assert!(forced.status.success());
}

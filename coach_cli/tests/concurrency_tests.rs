//! Concurrency tests for the coach binary.
//!
//! These tests verify that multiple processes sharing one data dir can
//! append completions and update stats without losing records.

use assert_cmd::Command;
use std::path::PathBuf;
use std::thread;
use tempfile::TempDir;

fn cli(data_dir: &PathBuf, config: &PathBuf) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("coach"));
    cmd.arg("--data-dir").arg(data_dir).arg("--config").arg(config);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_completions_all_logged() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config = temp_dir.path().join("config.toml");

    cli(&data_dir, &config).arg("login").arg("alice").assert().success();

    // One process per day of the week, all appending at once
    let handles: Vec<_> = (3..10)
        .map(|day| {
            let data_dir = data_dir.clone();
            let config = config.clone();
            thread::spawn(move || {
                cli(&data_dir, &config)
                    .arg("complete")
                    .arg("kegel-morning")
                    .arg("--date")
                    .arg(format!("2024-06-{:02}", day))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("CLI thread panicked");
    }

    let log = std::fs::read_to_string(data_dir.join("completed_exercises.jsonl"))
        .expect("Failed to read completion log");
    assert_eq!(log.lines().count(), 7);

    // Every line is a complete JSON record
    for line in log.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("torn line");
        assert_eq!(value["user_id"], "alice");
    }
}

#[test]
fn test_sequential_runs_accumulate_totals() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config = temp_dir.path().join("config.toml");

    cli(&data_dir, &config).arg("login").arg("alice").assert().success();

    for day in 3..6 {
        cli(&data_dir, &config)
            .arg("complete")
            .arg("kegel-night")
            .arg("--date")
            .arg(format!("2024-06-{:02}", day))
            .assert()
            .success();
    }

    let stats: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(data_dir.join("user_stats.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stats["users"]["alice"]["total_completed"], 3);
}

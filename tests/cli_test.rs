use assert_cmd::Command;
use filetime::{set_file_mtime, FileTime};
use predicates::prelude::*;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Command with its data directory isolated in `home`
fn runsweep(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("runsweep").unwrap();
    cmd.env("RUNSWEEP_HOME", home).env_remove("RUST_LOG");
    cmd
}

fn aged_file(dir: &Path, name: &str, age_secs: u64) {
    let path = dir.join(name);
    std::fs::write(&path, name).unwrap();
    let mtime = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(age_secs));
    set_file_mtime(&path, mtime).unwrap();
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("retention"))
        .stdout(predicate::str::contains("sweep"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("runsweep"));
}

// ─── Sweep command ───────────────────────────────────────────────────────────

#[test]
fn test_sweep_deletes_stale_and_keeps_exempt() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    aged_file(run.path(), "a.txt", 120);
    aged_file(run.path(), "b.txt", 10);
    aged_file(run.path(), "keepme", 300);

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "60s", "--exempt", "keepme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"));

    assert!(!run.path().join("a.txt").exists());
    assert!(run.path().join("b.txt").exists());
    assert!(run.path().join("keepme").exists());
}

#[test]
fn test_sweep_json_output() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    aged_file(run.path(), "old.log", 600);

    let output = runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "1m", "--format", "json", "--no-history"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["deleted"], 1);
    assert_eq!(json["retention_secs"], 60);
}

#[test]
fn test_sweep_quiet_output() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    aged_file(run.path(), "old.log", 600);
    aged_file(run.path(), "massccs", 600);

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "60", "--quiet"])
        .assert()
        .success()
        .stdout("2  1  0  0  1  0  0\n");
}

#[test]
fn test_sweep_missing_directory_fails() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path().join("does-not-exist"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid sweep directory"));
}

#[test]
fn test_sweep_partial_failure_exit_code() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    let sub = run.path().join("busy");
    std::fs::create_dir(&sub).unwrap();
    std::fs::write(sub.join("frame"), "x").unwrap();
    set_file_mtime(
        &sub,
        FileTime::from_system_time(SystemTime::now() - Duration::from_secs(600)),
    )
    .unwrap();

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "60", "--dir-policy", "empty", "--quiet"])
        .assert()
        .code(2);

    assert!(sub.exists());
}

#[test]
fn test_sweep_removes_stale_empty_dir_by_default() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    let sub = run.path().join("job-17");
    std::fs::create_dir(&sub).unwrap();
    set_file_mtime(
        &sub,
        FileTime::from_system_time(SystemTime::now() - Duration::from_secs(600)),
    )
    .unwrap();

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "60", "--quiet"])
        .assert()
        .success()
        .stdout("1  1  0  0  0  0  0\n");

    assert!(!sub.exists());
}

#[test]
fn test_sweep_skip_policy_reports_skipped() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    let sub = run.path().join("job-17");
    std::fs::create_dir(&sub).unwrap();
    set_file_mtime(
        &sub,
        FileTime::from_system_time(SystemTime::now() - Duration::from_secs(600)),
    )
    .unwrap();

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "60", "--dir-policy", "skip", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 skipped"));

    assert!(sub.exists());
}

#[test]
fn test_sweep_refuses_root() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["sweep", "/", "--retention", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("protected"));
}

#[test]
fn test_sweep_rejects_bad_retention() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["sweep", ".", "--retention", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}

#[test]
fn test_sweep_uses_configured_defaults() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    aged_file(run.path(), "old", 600);
    aged_file(run.path(), "precious", 600);
    std::fs::write(
        home.path().join("config.toml"),
        format!(
            "directory = {:?}\nretention_secs = 60\nexempt = [\"precious\"]\n",
            run.path().display().to_string()
        ),
    )
    .unwrap();

    runsweep(home.path())
        .args(["sweep", "--quiet"])
        .assert()
        .success();

    assert!(!run.path().join("old").exists());
    assert!(run.path().join("precious").exists());
}

// ─── History command ─────────────────────────────────────────────────────────

#[test]
fn test_history_records_sweeps() {
    let home = TempDir::new().unwrap();
    let run = TempDir::new().unwrap();
    aged_file(run.path(), "old", 600);

    runsweep(home.path())
        .arg("sweep")
        .arg(run.path())
        .args(["--retention", "60", "--quiet"])
        .assert()
        .success();

    runsweep(home.path())
        .args(["history", "--quiet"])
        .assert()
        .success()
        .stdout("1\n");

    runsweep(home.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sweep History"));
}

#[test]
fn test_history_empty() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sweeps recorded yet"));
}

// ─── Config command ──────────────────────────────────────────────────────────

#[test]
fn test_config_show() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("retention_secs"))
        .stdout(predicate::str::contains("massccs"));
}

#[test]
fn test_config_set_and_show() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["config", "set", "retention", "24h"])
        .assert()
        .success();

    runsweep(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("retention_secs = 86400"));
}

#[test]
fn test_config_set_exempt_takes_each_value() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["config", "set", "exempt", "massccs", "keep,me"])
        .assert()
        .success();

    runsweep(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""keep,me""#))
        .stdout(predicate::str::contains(r#""massccs""#));
}

#[test]
fn test_config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_init_creates_dirs() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["config", "init"])
        .assert()
        .success();

    assert!(home.path().join("config.toml").exists());
    assert!(home.path().join("history").is_dir());
    assert!(home.path().join("logs").is_dir());
}

// ─── Completions ─────────────────────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    runsweep(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("runsweep"));
}

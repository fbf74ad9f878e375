#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Empty config file so a developer's own config never leaks into the run.
fn empty_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "").expect("write config");
    path
}

fn sweep_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("thread-sweep");
    cmd.env_remove("THREAD_SWEEP_EXE")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(empty_config(dir))
        .arg("--no-show")
        .arg("--output")
        .arg(dir.join("chart.svg"));
    cmd
}

#[test]
fn missing_executable_exits_with_status_one() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("zad5.exe");
    let output = sweep_cmd(dir.path())
        .arg("--exe")
        .arg(&missing)
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("executable not found"), "stderr: {stderr}");
    assert!(stderr.contains("zad5.exe"), "stderr: {stderr}");
    assert!(!dir.path().join("chart.svg").exists());
}

#[test]
fn unconfigured_executable_is_a_config_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = sweep_cmd(dir.path())
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("no executable configured"));
}

#[test]
fn zero_max_threads_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    sweep_cmd(dir.path())
        .args(["--exe", "/bin/sh", "--max-threads", "0"])
        .assert()
        .code(1);
}

#[test]
fn malformed_step_list_is_a_usage_error() {
    let dir = TempDir::new().expect("tempdir");
    sweep_cmd(dir.path())
        .args(["--exe", "/bin/sh", "--steps", "10,ten"])
        .assert()
        .code(2);
}

#[cfg(unix)]
mod with_stub {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("pi.sh");
        fs::write(&path, format!("#!/bin/sh\nread steps\nread threads\n{body}\n"))
            .expect("write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
        path
    }

    #[test]
    fn sweep_prints_heartbeats_and_writes_artifacts() {
        let dir = TempDir::new().expect("tempdir");
        let exe = write_stub(dir.path(), "echo 'Czas obliczen: 0.5000 s'");
        let csv = dir.path().join("results.csv");
        let output = sweep_cmd(dir.path())
            .arg("--exe")
            .arg(&exe)
            .args(["--steps", "10", "--max-threads", "6", "--plain"])
            .arg("--csv")
            .arg(&csv)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let stdout = String::from_utf8_lossy(&output);
        assert!(stdout.contains("threads: 1 -> time: 0.5000 s"), "stdout: {stdout}");
        assert!(stdout.contains("threads: 5 -> time: 0.5000 s"), "stdout: {stdout}");
        assert!(!stdout.contains("threads: 2 ->"), "stdout: {stdout}");
        assert!(!stdout.contains("threads: 6 ->"), "stdout: {stdout}");
        assert!(stdout.contains("Chart saved as"), "stdout: {stdout}");

        assert!(dir.path().join("chart.svg").exists());
        let rows = fs::read_to_string(&csv).expect("csv written");
        assert_eq!(rows.lines().count(), 7);
    }

    #[test]
    fn trial_failures_do_not_change_exit_status() {
        let dir = TempDir::new().expect("tempdir");
        let exe = write_stub(dir.path(), "echo 'Blad programu'");
        let output = sweep_cmd(dir.path())
            .arg("--exe")
            .arg(&exe)
            .args(["--steps", "10,20", "--max-threads", "2", "--quiet"])
            .assert()
            .success()
            .get_output()
            .stderr
            .clone();
        let stderr = String::from_utf8_lossy(&output);
        assert_eq!(stderr.matches("no elapsed time for").count(), 4, "stderr: {stderr}");
        assert!(stderr.contains("Blad programu"));
    }

    #[test]
    fn malformed_elapsed_time_stops_the_series_with_a_warning() {
        let dir = TempDir::new().expect("tempdir");
        let exe = write_stub(dir.path(), "echo 'Czas obliczen: 1.2.3'");
        let output = sweep_cmd(dir.path())
            .arg("--exe")
            .arg(&exe)
            .args(["--steps", "10,20", "--max-threads", "3", "--quiet"])
            .assert()
            .success()
            .get_output()
            .clone();
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(stderr.matches("stopping at 1 threads").count(), 2, "stderr: {stderr}");
        assert!(stderr.contains("`1.2.3`"), "stderr: {stderr}");
        assert!(!stderr.contains("no elapsed time for"), "stderr: {stderr}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("10 steps: 0 of 3 thread counts"), "stdout: {stdout}");
    }
}

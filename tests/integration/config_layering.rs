#![allow(missing_docs)]
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn write_stub(dir: &Path) -> PathBuf {
    let path = dir.join("pi.sh");
    fs::write(
        &path,
        "#!/bin/sh\nread steps\nread threads\necho \"Czas obliczen: $threads.0\"\n",
    )
    .expect("write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    path
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, body).expect("write config");
    path
}

fn csv_rows(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("csv written")
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[test]
fn config_file_drives_the_sweep() {
    let dir = TempDir::new().expect("tempdir");
    let exe = write_stub(dir.path());
    let csv = dir.path().join("out.csv");
    let config = write_config(
        dir.path(),
        &format!(
            "executable = {:?}\nsteps = [30, 10]\nmax_threads = 2\noutput = {:?}\ncsv = {:?}\nshow = false\n",
            exe.display().to_string(),
            dir.path().join("chart.svg").display().to_string(),
            csv.display().to_string(),
        ),
    );

    cargo_bin_cmd!("thread-sweep")
        .env_remove("THREAD_SWEEP_EXE")
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .assert()
        .success();

    assert_eq!(csv_rows(&csv), vec!["30,1,1", "30,2,2", "10,1,1", "10,2,2"]);
    assert!(dir.path().join("chart.svg").exists());
}

#[test]
fn flags_override_config_file() {
    let dir = TempDir::new().expect("tempdir");
    let exe = write_stub(dir.path());
    let csv = dir.path().join("out.csv");
    let config = write_config(
        dir.path(),
        "executable = \"/definitely/not/here\"\nsteps = [30, 10]\nmax_threads = 2\nshow = false\n",
    );

    cargo_bin_cmd!("thread-sweep")
        .env_remove("THREAD_SWEEP_EXE")
        .env("THREAD_SWEEP_CONFIG", &config)
        .arg("--exe")
        .arg(&exe)
        .args(["--steps", "5", "--max-threads", "3", "--quiet"])
        .arg("--output")
        .arg(dir.path().join("chart.svg"))
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success();

    assert_eq!(csv_rows(&csv), vec!["5,1,1", "5,2,2", "5,3,3"]);
}

#[test]
fn malformed_config_file_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(dir.path(), "max_threads = \"many\"\n");
    let output = cargo_bin_cmd!("thread-sweep")
        .arg("--config")
        .arg(&config)
        .arg("--no-show")
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("failed to parse config"));
}

//! CLI end-to-end tests
//!
//! Tests for the trackforge command-line interface that need no media tools.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the trackforge binary
#[allow(deprecated)]
fn trackforge_cmd() -> Command {
    Command::cargo_bin("trackforge").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = trackforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_lists_commands() {
    let mut cmd = trackforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("script"))
        .stdout(predicate::str::contains("check-tools"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = trackforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("trackforge "));
}

#[test]
fn test_cli_check_tools_json() {
    let mut cmd = trackforge_cmd();
    let output = cmd.args(["check-tools", "--json"]).output().unwrap();
    assert!(output.status.success());
    let tools: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["ffmpeg", "ffprobe", "mediainfo", "mkvmerge", "qaac", "bdsup2sub"]);
}

#[test]
fn test_cli_validate_good_config() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("trackforge.toml");
    fs::write(
        &config_file,
        r#"
[[tracks]]
type = "video"
languages = ["und"]

[[tracks]]
type = "audio"
languages = ["eng", "rus"]
"#,
    )
    .unwrap();

    let mut cmd = trackforge_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Audio (full): eng, rus"));
}

#[test]
fn test_cli_validate_rejects_conflicts() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("trackforge.toml");
    fs::write(&config_file, "[policy]\nkeep_video = true\nrecode_video = true\n").unwrap();

    let mut cmd = trackforge_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_cli_conflicting_flags_fail_before_any_movie() {
    let temp = tempdir().unwrap();
    let mut cmd = trackforge_cmd();
    cmd.current_dir(temp.path())
        .args(["plan", "--keep-video", "--recode-video", "/nonexistent/movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_cli_plan_nonexistent_input() {
    let temp = tempdir().unwrap();
    let mut cmd = trackforge_cmd();
    cmd.current_dir(temp.path())
        .args(["plan", "/nonexistent/path/movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_plan_empty_directory() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("notes.txt"), "nothing to see").unwrap();
    let mut cmd = trackforge_cmd();
    cmd.current_dir(temp.path())
        .args(["plan", temp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No movies found"));
}

#[test]
fn test_cli_probe_nonexistent_file() {
    let mut cmd = trackforge_cmd();
    cmd.args(["probe", "/nonexistent/path/movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_rejects_bad_crop() {
    let mut cmd = trackforge_cmd();
    cmd.args(["plan", "--crop", "wide", "/m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid crop"));
}

use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config for sim mode; travel time short enough that movement
// commands land well within the test timeout.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[[covers]]
name = "blind"
switch_entity = "switch.blind"
travel_time_s = 1.0
initial_position = 0
"#;
    let path = dir.path().join("covers.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["status"], 0, "position 0", "stdout")]
#[case(&["stop"], 0, "position 0", "stdout")]
#[case(&["set-position"], 2, "required", "stderr")]
#[case(&["set-position", "fifty"], 2, "invalid value", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cover_cli").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg);

    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn set_position_runs_to_completion() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config").arg(&cfg).args(["set-position", "50"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("position 0 (opening)"))
        .stdout(predicate::str::contains("position 50 (stopped)"));
}

#[rstest]
fn json_mode_emits_state_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("--json").arg("open");

    let output = cmd.assert().success().get_output().stdout.clone();
    let last = String::from_utf8(output)
        .unwrap()
        .lines()
        .last()
        .map(str::to_string)
        .expect("at least one state line");
    let v: serde_json::Value = serde_json::from_str(&last).expect("valid JSON line");
    assert_eq!(v["cover"], "blind");
    assert_eq!(v["position"], 100);
    assert_eq!(v["status"], "open");
}

#[rstest]
fn invalid_config_is_rejected_before_running() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("covers.toml");
    fs::write(
        &path,
        r#"
[[covers]]
name = "blind"
switch_entity = "switch.blind"
travel_time_s = 900.0
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config").arg(&path).arg("status");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("travel_time_s"));
}

#[rstest]
fn missing_config_file_is_reported() {
    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config").arg("/nonexistent/covers.toml").arg("status");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read config"));
}

#[rstest]
fn multiple_covers_require_a_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("covers.toml");
    fs::write(
        &path,
        r#"
[[covers]]
name = "blind"
switch_entity = "switch.blind"
travel_time_s = 1.0

[[covers]]
name = "awning"
switch_entity = "switch.awning"
travel_time_s = 1.0
initial_position = 100
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config").arg(&path).arg("status");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("--cover"));

    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config")
        .arg(&path)
        .args(["--cover", "awning", "status"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("awning: position 100"));
}

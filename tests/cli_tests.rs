// Command-line tool against a scripted helper
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use dtruss_stream::SENTINEL;
use predicates::prelude::*;
use utils::{record_line, FakeHelper, OPEN_LINE};

fn cmd_for(helper: &FakeHelper) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dtruss-stream");
    cmd.arg("--helper")
        .arg(helper.script())
        .arg("--poll-interval-ms")
        .arg("5");
    cmd
}

#[test]
fn test_text_output() {
    let failed = record_line("open", &["/nope", "0x0"], -1, 2, 100, 2.0);
    let helper = FakeHelper::new(&[OPEN_LINE, "garbage", failed.as_str(), SENTINEL]);

    cmd_for(&helper)
        .arg("/bin/ls")
        .assert()
        .success()
        .stdout("open(/tmp/a) -> 0x3\nopen(/nope, 0x0) -> -0x1 (errno = 2)\n");
}

#[test]
fn test_json_output() {
    let helper = FakeHelper::new(&[OPEN_LINE, SENTINEL]);

    let output = cmd_for(&helper)
        .arg("--format")
        .arg("json")
        .arg("/bin/ls")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);

    let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(parsed["syscall"], "open");
    assert_eq!(parsed["args"][0], "/tmp/a");
    assert_eq!(parsed["retval"], 3);
    assert_eq!(parsed["pid"], 100);
}

#[test]
fn test_forwards_filter_timeout_and_target_args() {
    let helper = FakeHelper::new(&[SENTINEL]);

    cmd_for(&helper)
        .args(["-t", "open", "-K", "3", "/bin/ls", "--", "-la", "/tmp"])
        .assert()
        .success()
        .stdout("");

    let argv = helper.recorded_argv().unwrap();
    assert_eq!(
        &argv[2..],
        &["-f", "-K", "3", "-t", "open", "/bin/ls", "-la", "/tmp"]
    );
}

#[test]
fn test_config_file() {
    let helper = FakeHelper::new(&[OPEN_LINE, SENTINEL]);
    let config_path = helper.out_dir().join("dtruss-stream.toml");
    std::fs::write(
        &config_path,
        format!(
            "helper = {:?}\npoll_interval_ms = 5\n",
            helper.script().to_string_lossy()
        ),
    )
    .unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("dtruss-stream")
        .arg("--config")
        .arg(&config_path)
        .arg("/bin/ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("open(/tmp/a)"));
}

#[test]
fn test_empty_target_fails() {
    let helper = FakeHelper::new(&[SENTINEL]);

    cmd_for(&helper)
        .arg("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn test_missing_target_fails() {
    assert_cmd::cargo::cargo_bin_cmd!("dtruss-stream")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TARGET"));
}

#[test]
fn test_debug_output_to_stderr() {
    let helper = FakeHelper::new(&[OPEN_LINE, SENTINEL]);

    let output = cmd_for(&helper).arg("--debug").arg("/bin/ls").output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stderr.contains("helper launched"), "no tracing output: {}", stderr);
    assert!(stderr.contains("sentinel seen"));
    assert_eq!(stdout, "open(/tmp/a) -> 0x3\n");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

#[tokio::test]
async fn run_with_timeout_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_nonzero_exit_is_not_an_error() {
    let cmd = Command::new("false");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "false")
        .await
        .unwrap();
    assert!(!output.status.success());
    assert!(failure_detail(&output).starts_with("exited with"));
}

#[tokio::test]
async fn run_with_timeout_io_error() {
    let cmd = Command::new("/nonexistent/binary");
    let result = run_with_timeout(cmd, Duration::from_secs(5), "nonexistent").await;
    let err = result.unwrap_err();
    assert!(err.starts_with("nonexistent failed:"), "got: {}", err);
}

#[tokio::test]
async fn run_with_timeout_timeout_elapsed() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let result = run_with_timeout(cmd, Duration::from_millis(100), "rm report").await;
    let err = result.unwrap_err();
    assert!(err.contains("timed out"), "got: {}", err);
    assert!(err.contains("rm report"), "got: {}", err);
}

#[tokio::test]
async fn failure_detail_prefers_stderr() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo 'queue full' >&2; exit 3"]);
    let output = run_with_timeout(cmd, Duration::from_secs(5), "sh")
        .await
        .unwrap();
    assert_eq!(failure_detail(&output), "queue full");
}

#[yare::parameterized(
    program_only = { "ferry-rm-bridge", Some(("ferry-rm-bridge", 0)) },
    with_args    = { "python3 bridge.py --verbose", Some(("python3", 2)) },
    padded       = { "  bridge  ", Some(("bridge", 0)) },
    blank        = { "   ", None },
)]
fn split_command_cases(line: &str, expected: Option<(&str, usize)>) {
    let split = split_command(line);
    assert_eq!(
        split.as_ref().map(|(p, args)| (p.as_str(), args.len())),
        expected
    );
}

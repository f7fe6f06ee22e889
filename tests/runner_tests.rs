//! Integration tests for the real process runner.
//!
//! These spawn actual processes via `/bin/sh`, so they are unix-only.

#![cfg(unix)]

use std::path::Path;
use std::time::{Duration, Instant};

use lumosc::runner::{ProcessRunner, ToolRunner};

fn sh(script: &str, timeout_ms: Option<u64>) -> lumosc::runner::RunOutput {
    ProcessRunner.run(
        Path::new("/bin/sh"),
        &["-c".to_string(), script.to_string()],
        timeout_ms,
    )
}

#[test]
fn test_zero_exit_is_success_with_captured_stdout() {
    let result = sh("echo hello", None);
    assert!(result.success);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout.trim(), "hello");
    assert!(result.stderr.is_empty());
    assert!(result.error.is_none());
}

#[test]
fn test_nonzero_exit_is_failure_with_captured_stderr() {
    let result = sh("echo diagnostics 1>&2; exit 3", None);
    assert!(!result.success);
    assert_eq!(result.exit_code, 3);
    assert_eq!(result.stderr.trim(), "diagnostics");
    // Tool-reported failures carry their diagnostics in stderr, not error.
    assert!(result.error.is_none());
}

#[test]
fn test_missing_binary_reports_sentinel_exit_code() {
    let result = ProcessRunner.run(
        Path::new("/nonexistent/arm-none-eabi-g++"),
        &["--version".to_string()],
        None,
    );
    assert!(!result.success);
    assert_eq!(result.exit_code, -1);
    assert!(result.error.is_some());
    assert!(result.stdout.is_empty());
}

#[test]
fn test_timeout_kills_the_process_within_bound() {
    let started = Instant::now();
    let result = sh("sleep 30", Some(5));
    let elapsed = started.elapsed();

    assert!(!result.success);
    assert_eq!(result.exit_code, -1);
    assert_eq!(result.error.as_deref(), Some("Command timed out"));
    assert!(
        elapsed < Duration::from_secs(5),
        "timeout took {:?}, expected well under the sleep duration",
        elapsed
    );
}

#[test]
fn test_fast_process_beats_generous_timeout() {
    let result = sh("echo quick", Some(5_000));
    assert!(result.success);
    assert_eq!(result.stdout.trim(), "quick");
    assert!(result.error.is_none());
}

#[test]
fn test_output_is_captured_even_on_timeout() {
    // The sleep is short: a killed shell can leave a child holding the pipe
    // open, and the runner drains it before returning.
    let result = sh("echo partial; sleep 2", Some(200));
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Command timed out"));
    assert_eq!(result.stdout.trim(), "partial");
}

//! External tool execution.
//!
//! Every compiler, linker and post-processing invocation goes through the
//! [`ToolRunner`] trait so the pipeline can be exercised against a recording
//! mock in tests. The real implementation captures both output streams in
//! memory; compiler logs are human-scale so nothing is spooled to disk.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    /// True iff the tool exited with code zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or `-1` when the process never produced one
    /// (launch failure, kill on timeout, signal termination)
    pub exit_code: i32,
    /// Infrastructure failure text (timeout, launch error). `None` for
    /// tool-reported failures, where `stderr` carries the diagnostics.
    pub error: Option<String>,
}

/// Seam between the build pipeline and the operating system.
pub trait ToolRunner {
    /// Run `tool` with `args`, waiting at most `timeout_ms` when set.
    fn run(&self, tool: &Path, args: &[String], timeout_ms: Option<u64>) -> RunOutput;
}

/// [`ToolRunner`] backed by real subprocesses.
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, tool: &Path, args: &[String], timeout_ms: Option<u64>) -> RunOutput {
        let mut child = match Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return RunOutput {
                    success: false,
                    exit_code: -1,
                    error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        };

        // Drain both pipes on their own threads so a chatty tool cannot
        // deadlock against a full pipe buffer while we wait on it.
        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let (status, timed_out) = match timeout_ms {
            None => match child.wait() {
                Ok(status) => (Some(status), false),
                Err(e) => {
                    return RunOutput {
                        success: false,
                        exit_code: -1,
                        error: Some(e.to_string()),
                        ..Default::default()
                    };
                }
            },
            Some(ms) => wait_with_timeout(&mut child, Duration::from_millis(ms)),
        };

        let stdout = join_reader(stdout_handle);
        let stderr = join_reader(stderr_handle);

        if timed_out {
            return RunOutput {
                success: false,
                stdout,
                stderr,
                exit_code: -1,
                error: Some("Command timed out".to_string()),
            };
        }

        let exit_code = status.and_then(|s| s.code()).unwrap_or(-1);
        RunOutput {
            success: exit_code == 0,
            stdout,
            stderr,
            exit_code,
            error: None,
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<std::thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Poll `try_wait` until the child exits or the deadline passes, then kill.
fn wait_with_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> (Option<std::process::ExitStatus>, bool) {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (Some(status), false),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    // Reap the killed child so it does not linger as a zombie.
                    let _ = child.wait();
                    return (None, true);
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return (None, true);
            }
        }
    }
}

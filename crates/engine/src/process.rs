// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process execution for a single job (§4.G steps 2-9): pipes opened
//! before spawn, stdin redirected to the null device, detached from the
//! controlling terminal on Unix, and a graduated SIGTERM-then-SIGKILL kill
//! path shared by cooperative cancellation and stale-job reclamation.

use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::command::marker_env;

/// Grace period between SIGTERM and SIGKILL when killing a job's process
/// (§4.G step 9, also used for stale-job reclamation in the monitor).
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// How a job's child process finished.
#[derive(Debug)]
pub enum JobOutcome {
    Completed { exit_code: i32, stdout: String, stderr: String },
    Failed { message: String, stdout: String, stderr: String },
    Cancelled { stdout: String, stderr: String },
}

/// True if a process with `pid` currently exists (a signal-0 probe, not a
/// wait; works for processes this one didn't parent too).
pub fn is_pid_running(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Send SIGTERM, wait [`KILL_GRACE`], then SIGKILL if the process is still
/// alive.
pub async fn graduated_kill(pid: u32) {
    let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    tokio::time::sleep(KILL_GRACE).await;
    if is_pid_running(pid) {
        let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
}

/// A spawned, not-yet-awaited child process plus the pid the caller should
/// persist before awaiting it (§4.G: "status -> running with pid").
pub struct SpawnedChild {
    pub child: Child,
    pub pid: Option<u32>,
}

/// Open stdout/stderr pipes and spawn `argv` (built by
/// [`crate::command::build_argv`]), with stdin redirected to the null
/// device and, on Unix, a fresh process group so the job doesn't inherit
/// this process's controlling terminal.
pub fn spawn_child(argv: &[String], execution_directory: &str) -> std::io::Result<SpawnedChild> {
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd.current_dir(execution_directory);
    cmd.envs(marker_env());
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let child = cmd.spawn()?;
    let pid = child.id();
    Ok(SpawnedChild { child, pid })
}

/// Drive an already-spawned child to completion, racing its exit against
/// `cancel`. Stdout/stderr are captured line by line and logged as they
/// arrive; on cancellation the process is killed via [`graduated_kill`]
/// before returning.
pub async fn drive_to_completion(mut child: Child, cancel: CancellationToken) -> JobOutcome {
    let pid = child.id();
    // spawn_child always requests piped stdout/stderr, so these are always Some.
    #[allow(clippy::expect_used)]
    let stdout = child.stdout.take().expect("stdout piped at spawn");
    #[allow(clippy::expect_used)]
    let stderr = child.stderr.take().expect("stderr piped at spawn");
    let stdout_task = tokio::spawn(drain_lines(stdout, "job.stdout"));
    let stderr_task = tokio::spawn(drain_lines(stderr, "job.stderr"));

    tokio::select! {
        status = child.wait() => {
            let stdout_res = stdout_task.await.unwrap_or_default();
            let stderr_res = stderr_task.await.unwrap_or_default();
            if let Some(failure) = pipe_failure(&stdout_res, &stderr_res) {
                return failure;
            }
            match status {
                Ok(status) if status.success() => JobOutcome::Completed {
                    exit_code: status.code().unwrap_or(0),
                    stdout: stdout_res.text,
                    stderr: stderr_res.text,
                },
                Ok(status) => JobOutcome::Failed {
                    message: format!("process exited with {status}"),
                    stdout: stdout_res.text,
                    stderr: stderr_res.text,
                },
                Err(err) => JobOutcome::Failed {
                    message: format!("failed to wait for process: {err}"),
                    stdout: stdout_res.text,
                    stderr: stderr_res.text,
                },
            }
        }
        _ = cancel.cancelled() => {
            if let Some(pid) = pid {
                graduated_kill(pid).await;
            }
            let _ = child.wait().await;
            let stdout_res = stdout_task.await.unwrap_or_default();
            let stderr_res = stderr_task.await.unwrap_or_default();
            // §4.G step 9: a cancelled job always carries non-empty stderr,
            // even when the process never wrote any of its own.
            let stderr = if stderr_res.text.is_empty() { "Job was cancelled".to_string() } else { stderr_res.text };
            JobOutcome::Cancelled { stdout: stdout_res.text, stderr }
        }
    }
}

/// If either pipe reader hit a read error, the job is failed outright
/// (§7: "pipe/read failure -> failed + stderr + 'Failed to ... pipe'")
/// rather than classified by exit status.
fn pipe_failure(stdout: &DrainResult, stderr: &DrainResult) -> Option<JobOutcome> {
    if stdout.error.is_some() {
        return Some(JobOutcome::Failed {
            message: "Failed to read stdout pipe".to_string(),
            stdout: stdout.text.clone(),
            stderr: stderr.text.clone(),
        });
    }
    if stderr.error.is_some() {
        return Some(JobOutcome::Failed {
            message: "Failed to read stderr pipe".to_string(),
            stdout: stdout.text.clone(),
            stderr: stderr.text.clone(),
        });
    }
    None
}

/// Spawn and drive `argv` to completion in one call. A convenience for
/// callers that don't need to persist the pid between the two steps.
pub async fn run_job_process(argv: &[String], execution_directory: &str, cancel: CancellationToken) -> JobOutcome {
    match spawn_child(argv, execution_directory) {
        Ok(spawned) => drive_to_completion(spawned.child, cancel).await,
        Err(err) => JobOutcome::Failed {
            message: format!("failed to start process: {err}"),
            stdout: String::new(),
            stderr: String::new(),
        },
    }
}

/// The text accumulated from a pipe reader, plus the read error (if any)
/// that ended the loop early rather than a clean EOF.
#[derive(Default)]
struct DrainResult {
    text: String,
    error: Option<std::io::Error>,
}

/// Read `reader` line by line, logging each line under `target` as it
/// arrives and returning the accumulated text. A read error ends the loop
/// and is reported on the result rather than discarded.
async fn drain_lines(reader: impl AsyncRead + Unpin, target: &'static str) -> DrainResult {
    let mut lines = BufReader::new(reader).lines();
    let mut result = DrainResult::default();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                match target {
                    "job.stdout" => tracing::debug!(target: "job.stdout", "{line}"),
                    _ => tracing::debug!(target: "job.stderr", "{line}"),
                }
                result.text.push_str(&line);
                result.text.push('\n');
            }
            Ok(None) => break,
            Err(err) => {
                result.error = Some(err);
                break;
            }
        }
    }
    result
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process argv and environment construction (§6).

/// The assistant CLI binary the executor shells out to.
pub const ASSISTANT_CLI: &str = "claude";

/// Marker environment variable set on every job's child process, so a
/// process tree inspection (or the CLI itself) can tell it was launched by
/// a job rather than interactively.
pub const JOB_MARKER_VAR: &str = "TRACKERD_JOB";

/// Names the entry point that launched the CLI.
pub const JOB_ENTRYPOINT_VAR: &str = "TRACKERD_ENTRYPOINT";
pub const JOB_ENTRYPOINT_VALUE: &str = "job";

/// Build argv for a job's command per the child-process contract: the
/// assistant CLI in non-interactive print mode, with `--dangerously-skip-permissions`
/// inserted ahead of `--print` when the job runs in yolo mode.
pub fn build_argv(command: &str, yolo_mode: bool) -> Vec<String> {
    let mut argv = vec![ASSISTANT_CLI.to_string()];
    if yolo_mode {
        argv.push("--dangerously-skip-permissions".to_string());
    }
    argv.push("--print".to_string());
    argv.push(command.to_string());
    argv
}

/// Marker environment variables added on top of the inherited environment.
pub fn marker_env() -> [(&'static str, &'static str); 2] {
    [(JOB_MARKER_VAR, "1"), (JOB_ENTRYPOINT_VAR, JOB_ENTRYPOINT_VALUE)]
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;

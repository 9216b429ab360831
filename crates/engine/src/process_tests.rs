// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::*;

fn argv(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn successful_command_reports_completed_with_captured_stdout() {
    let outcome = run_job_process(&argv("echo hello"), "/tmp", CancellationToken::new()).await;
    match outcome {
        JobOutcome::Completed { exit_code, stdout, .. } => {
            assert_eq!(exit_code, 0);
            assert_eq!(stdout, "hello\n");
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn nonzero_exit_reports_failed() {
    let outcome = run_job_process(&argv("exit 7"), "/tmp", CancellationToken::new()).await;
    match outcome {
        JobOutcome::Failed { message, .. } => assert!(message.contains('7')),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_binary_reports_failed_without_panicking() {
    let outcome = run_job_process(&argv("nonexistent-binary-xyz"), "/tmp", CancellationToken::new()).await;
    assert!(matches!(outcome, JobOutcome::Failed { .. } | JobOutcome::Completed { .. }));
}

#[tokio::test]
async fn cancellation_kills_the_process_and_reports_cancelled() {
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let handle = tokio::spawn(async move { run_job_process(&argv("sleep 30"), "/tmp", cancel_clone).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(8), handle)
        .await
        .expect("run_job_process should return promptly after cancel")
        .expect("task join");
    assert!(matches!(outcome, JobOutcome::Cancelled { .. }));
}

#[test]
fn is_pid_running_is_false_for_an_unlikely_pid() {
    assert!(!is_pid_running(u32::MAX));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use trk_core::Event;

use super::MaterializedState;

pub fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::JobCreated { job } => {
            state.jobs.insert(job.id, job.clone());
        }
        Event::JobStatusChanged {
            id,
            status,
            started_at,
            completed_at,
            pid,
            clear_pid,
        } => {
            if let Some(job) = state.jobs.get_mut(id) {
                job.status = *status;
                if started_at.is_some() {
                    job.started_at = *started_at;
                }
                if completed_at.is_some() {
                    job.completed_at = *completed_at;
                }
                if *clear_pid {
                    job.pid = None;
                } else if pid.is_some() {
                    job.pid = *pid;
                }
            }
        }
        Event::JobLogsUpdated {
            id,
            output_log,
            error_log,
            exit_code,
        } => {
            if let Some(job) = state.jobs.get_mut(id) {
                if output_log.is_some() {
                    job.output_log = output_log.clone();
                }
                if error_log.is_some() {
                    job.error_log = error_log.clone();
                }
                if exit_code.is_some() {
                    job.exit_code = *exit_code;
                }
            }
        }
        Event::JobDeleted { id } => {
            state.jobs.remove(id);
        }
        _ => {}
    }
}

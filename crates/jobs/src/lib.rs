// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trk-jobs: the job service (§4.F). Validates creation requests against
//! the four scheduling modes and otherwise delegates straight to the raw
//! job persistence primitives in `trk_storage`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use trk_core::entities::{Job, JobId, JobStatus, ScheduleType};
use trk_core::{Clock, CoreError, CoreResult, ProjectId};
use trk_storage::{JobFilters, Store};

/// Lower and upper bound (inclusive) on `delayed`'s `delay_hours` parameter.
const MIN_DELAY_HOURS: i64 = 1;
const MAX_DELAY_HOURS: i64 = 168;

/// The four scheduling modes from §4.F, carrying only the parameters each
/// one actually uses.
#[derive(Debug, Clone)]
pub enum ScheduleRequest {
    Immediate,
    AfterReset,
    Delayed { delay_hours: i64 },
    Scheduled { scheduled_time: DateTime<Utc> },
}

impl ScheduleRequest {
    fn schedule_type(&self) -> ScheduleType {
        match self {
            ScheduleRequest::Immediate => ScheduleType::Immediate,
            ScheduleRequest::AfterReset => ScheduleType::AfterReset,
            ScheduleRequest::Delayed { .. } => ScheduleType::Delayed,
            ScheduleRequest::Scheduled { .. } => ScheduleType::Scheduled,
        }
    }

    fn params_json(&self) -> Option<serde_json::Value> {
        match self {
            ScheduleRequest::Immediate | ScheduleRequest::AfterReset => None,
            ScheduleRequest::Delayed { delay_hours } => Some(serde_json::json!({ "delay_hours": delay_hours })),
            ScheduleRequest::Scheduled { scheduled_time } => Some(serde_json::json!({ "scheduled_time": scheduled_time })),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobCreateRequest {
    pub project_id: ProjectId,
    pub command: String,
    pub yolo_mode: bool,
    pub priority: i32,
    pub schedule: ScheduleRequest,
}

/// Wraps a store shared with the rest of the process (§5: "the store
/// handle is shared"); the executor and scheduler hold the same handle.
pub struct JobService<C: Clock> {
    store: Arc<Mutex<Store<C>>>,
}

impl<C: Clock> JobService<C> {
    pub fn new(store: Arc<Mutex<Store<C>>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Mutex<Store<C>>> {
        &self.store
    }

    /// Validate `request` against its schedule type and persist a new
    /// `pending` job with `execution_directory` copied from the project.
    pub fn create(&mut self, request: JobCreateRequest) -> CoreResult<Job> {
        let mut store = self.store.lock();
        let project = store
            .state()
            .projects
            .get(&request.project_id)
            .cloned()
            .ok_or_else(|| CoreError::ProjectNotActive(request.project_id.to_string()))?;
        if !project.is_active {
            return Err(CoreError::ProjectNotActive(request.project_id.to_string()));
        }

        let now = store.clock().now_utc();
        let scheduled_at = resolve_scheduled_at(&request.schedule, now)?;

        let job = Job {
            id: JobId::new(),
            project_id: request.project_id,
            command: request.command,
            execution_directory: project.path,
            yolo_mode: request.yolo_mode,
            status: JobStatus::Pending,
            priority: request.priority,
            created_at: now,
            started_at: None,
            completed_at: None,
            output_log: None,
            error_log: None,
            exit_code: None,
            pid: None,
            scheduled_at,
            schedule_type: Some(request.schedule.schedule_type()),
            schedule_params: request.schedule.params_json(),
        };

        store.insert_job(job.clone())?;
        Ok(job)
    }

    pub fn get(&self, id: JobId) -> Option<Job> {
        self.store.lock().get_job(id)
    }

    pub fn list(&self, filters: &JobFilters) -> Vec<Job> {
        self.store.lock().list_jobs(filters)
    }

    pub fn update_status(&mut self, id: JobId, status: JobStatus, pid: Option<u32>) -> CoreResult<()> {
        self.store.lock().set_job_status(id, status, pid)
    }

    pub fn update_logs(
        &mut self,
        id: JobId,
        stdout: Option<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> CoreResult<()> {
        self.store.lock().set_job_logs(id, stdout, stderr, exit_code)
    }

    pub fn delete(&mut self, id: JobId) -> CoreResult<()> {
        self.store.lock().delete_job(id)
    }
}

/// Validate `schedule` and compute the `scheduled_at` column it implies.
fn resolve_scheduled_at(schedule: &ScheduleRequest, now: DateTime<Utc>) -> CoreResult<Option<DateTime<Utc>>> {
    match schedule {
        ScheduleRequest::Immediate => Ok(Some(now)),
        ScheduleRequest::AfterReset => Ok(None),
        ScheduleRequest::Delayed { delay_hours } => {
            if *delay_hours < MIN_DELAY_HOURS || *delay_hours > MAX_DELAY_HOURS {
                return Err(CoreError::Validation(format!(
                    "delay_hours must be between {MIN_DELAY_HOURS} and {MAX_DELAY_HOURS}"
                )));
            }
            Ok(Some(now + Duration::hours(*delay_hours)))
        }
        ScheduleRequest::Scheduled { scheduled_time } => {
            if *scheduled_time <= now {
                return Err(CoreError::Validation("scheduled_time must be strictly in the future".to_string()));
            }
            Ok(Some(*scheduled_time))
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw job persistence (the store half of §4.F; scheduling-parameter
//! validation lives in the job-service crate layered on top of this).

use trk_core::entities::{Job, JobId, JobStatus, ProjectId};
use trk_core::{Clock, CoreError, CoreResult, Event};

use super::Store;

/// Filter and pagination parameters for [`Store::list_jobs`].
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub project_id: Option<ProjectId>,
    pub status: Option<JobStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl<C: Clock> Store<C> {
    pub fn insert_job(&mut self, job: Job) -> CoreResult<()> {
        self.emit(Event::JobCreated { job })
    }

    pub fn get_job(&self, id: JobId) -> Option<Job> {
        self.state.jobs.get(&id).cloned()
    }

    /// Jobs matching `filters`, ordered `priority DESC, created_at DESC`.
    /// `limit` is clamped to 100 regardless of what the caller asked for.
    pub fn list_jobs(&self, filters: &JobFilters) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .state
            .jobs
            .values()
            .filter(|job| filters.project_id.map_or(true, |p| job.project_id == p))
            .filter(|job| filters.status.map_or(true, |s| job.status == s))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| b.created_at.cmp(&a.created_at)));

        let limit = if filters.limit == 0 { 100 } else { filters.limit.min(100) };
        jobs.into_iter().skip(filters.offset).take(limit).collect()
    }

    /// Transition `id` to `status`. Entering `running` stamps `started_at`
    /// (if unset) and records `pid`; entering any terminal status stamps
    /// `completed_at` and clears `pid`. Other transitions touch neither.
    pub fn set_job_status(&mut self, id: JobId, status: JobStatus, pid: Option<u32>) -> CoreResult<()> {
        let job = self.state.jobs.get(&id).ok_or_else(|| CoreError::JobNotFound(id.to_string()))?;
        let now = self.clock.now_utc();

        let (started_at, completed_at, clear_pid, pid) = if status == JobStatus::Running {
            let started_at = if job.started_at.is_none() { Some(now) } else { None };
            (started_at, None, false, pid)
        } else if status.is_terminal() {
            (None, Some(now), true, None)
        } else {
            (None, None, false, None)
        };

        self.emit(Event::JobStatusChanged { id, status, started_at, completed_at, pid, clear_pid })
    }

    pub fn set_job_logs(
        &mut self,
        id: JobId,
        output_log: Option<String>,
        error_log: Option<String>,
        exit_code: Option<i32>,
    ) -> CoreResult<()> {
        if !self.state.jobs.contains_key(&id) {
            return Err(CoreError::JobNotFound(id.to_string()));
        }
        self.emit(Event::JobLogsUpdated { id, output_log, error_log, exit_code })
    }

    pub fn delete_job(&mut self, id: JobId) -> CoreResult<()> {
        let job = self.state.jobs.get(&id).ok_or_else(|| CoreError::JobNotFound(id.to_string()))?;
        if job.status == JobStatus::Running {
            return Err(CoreError::CannotDeleteRunningJob);
        }
        self.emit(Event::JobDeleted { id })
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;

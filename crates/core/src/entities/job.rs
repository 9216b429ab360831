// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job rows (§3, §4.F/G). Lifecycle is `pending -> running -> (completed |
//! failed | cancelled)`, with `pending -> cancelled` also legal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ProjectId;

crate::define_id! {
    /// Opaque job identifier.
    pub struct JobId("job-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Immediate,
    AfterReset,
    Delayed,
    Scheduled,
}

crate::simple_display! {
    ScheduleType {
        Immediate => "immediate",
        AfterReset => "after_reset",
        Delayed => "delayed",
        Scheduled => "scheduled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project_id: ProjectId,
    pub command: String,
    pub execution_directory: String,
    pub yolo_mode: bool,
    pub status: JobStatus,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub output_log: Option<String>,
    pub error_log: Option<String>,
    pub exit_code: Option<i32>,
    pub pid: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub schedule_type: Option<ScheduleType>,
    pub schedule_params: Option<serde_json::Value>,
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        into { command: String = "echo hi", execution_directory: String = "/tmp" }
        set { yolo_mode: bool = false, status: JobStatus = JobStatus::Pending, priority: i32 = 0 }
        option { schedule_type: ScheduleType = None }
        computed {
            id: JobId = JobId::new(),
            project_id: ProjectId = ProjectId::new(),
            created_at: DateTime<Utc> = Utc::now(),
            started_at: Option<DateTime<Utc>> = None,
            completed_at: Option<DateTime<Utc>> = None,
            output_log: Option<String> = None,
            error_log: Option<String> = None,
            exit_code: Option<i32> = None,
            pid: Option<u32> = None,
            scheduled_at: Option<DateTime<Utc>> = None,
            schedule_params: Option<serde_json::Value> = None
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The WAL event vocabulary. Every store mutation is represented as one of
//! these variants before it is applied to `MaterializedState` and appended
//! to the write-ahead log; replaying the log from empty state must produce
//! the same materialized state as the live sequence of mutations did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    FileSyncState, Job, JobStatus, Project, Session, SessionWindow, SessionWindowId,
    WindowMessage,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "project:upserted")]
    ProjectUpserted { project: Project },

    #[serde(rename = "session:upserted")]
    SessionUpserted { session: Session },

    #[serde(rename = "message:upserted")]
    MessageUpserted {
        message: Box<crate::entities::Message>,
        session_id: String,
    },

    #[serde(rename = "window:created")]
    WindowCreated { window: SessionWindow },

    #[serde(rename = "window:stats_updated")]
    WindowStatsUpdated {
        window_id: SessionWindowId,
        total_input_tokens: u64,
        total_output_tokens: u64,
        total_tokens: u64,
        message_count: u64,
        session_count: u64,
        total_cost: f64,
        updated_at: DateTime<Utc>,
    },

    #[serde(rename = "window:message_linked")]
    WindowMessageLinked { link: WindowMessage },

    #[serde(rename = "window:all_reset")]
    WindowsReset,

    #[serde(rename = "file_sync:updated")]
    FileSyncStateUpdated { state: FileSyncState },

    #[serde(rename = "file_sync:deleted")]
    FileSyncStateDeleted { file_path: String },

    #[serde(rename = "job:created")]
    JobCreated { job: Job },

    #[serde(rename = "job:status_changed")]
    JobStatusChanged {
        id: crate::entities::JobId,
        status: JobStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        pid: Option<u32>,
        /// Cleared alongside a terminal transition; `None` means "leave as is".
        clear_pid: bool,
    },

    #[serde(rename = "job:logs_updated")]
    JobLogsUpdated {
        id: crate::entities::JobId,
        output_log: Option<String>,
        error_log: Option<String>,
        exit_code: Option<i32>,
    },

    #[serde(rename = "job:deleted")]
    JobDeleted { id: crate::entities::JobId },
}

/// Namespace fragment used to group WAL entries for diagnostics, mirroring
/// the event-family groupings `MaterializedState::apply_event` dispatches on.
pub fn ns_fragment(event: &Event) -> &'static str {
    match event {
        Event::ProjectUpserted { .. } => "project",
        Event::SessionUpserted { .. } => "session",
        Event::MessageUpserted { .. } => "message",
        Event::WindowCreated { .. }
        | Event::WindowStatsUpdated { .. }
        | Event::WindowMessageLinked { .. }
        | Event::WindowsReset => "window",
        Event::FileSyncStateUpdated { .. } | Event::FileSyncStateDeleted { .. } => "file_sync",
        Event::JobCreated { .. }
        | Event::JobStatusChanged { .. }
        | Event::JobLogsUpdated { .. }
        | Event::JobDeleted { .. } => "job",
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

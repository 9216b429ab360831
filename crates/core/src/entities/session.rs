// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session rows. `id` is external — it comes from the log file's
//! `sessionId` field, never generated here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

crate::simple_display! {
    SessionStatus {
        Active => "active",
        Completed => "completed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub project_name: String,
    pub project_path: String,
    pub project_id: Option<crate::entities::ProjectId>,
    /// Monotonically non-increasing: the earliest observed message wins.
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
    pub message_count: u64,
    pub total_cost: f64,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        project_name: impl Into<String>,
        project_path: impl Into<String>,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_name: project_name.into(),
            project_path: project_path.into(),
            project_id: None,
            start_time,
            end_time: None,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_tokens: 0,
            message_count: 0,
            total_cost: 0.0,
            status: SessionStatus::Active,
            created_at: now,
        }
    }
}

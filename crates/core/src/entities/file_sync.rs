// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-file ingest cursor (§3, §4.B). `file_path` is the primary key;
//! there is no separate generated ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

crate::simple_display! {
    SyncStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Error => "error",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSyncState {
    pub file_path: String,
    pub last_modified: DateTime<Utc>,
    pub file_size: u64,
    pub last_processed_line: u64,
    pub processed_until: Option<DateTime<Utc>>,
    pub checksum: Option<String>,
    pub sync_status: SyncStatus,
    pub last_sync_time: DateTime<Utc>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileSyncState {
    pub fn fresh(file_path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            file_path: file_path.into(),
            last_modified: now,
            file_size: 0,
            last_processed_line: 0,
            processed_until: None,
            checksum: None,
            sync_status: SyncStatus::Pending,
            last_sync_time: now,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

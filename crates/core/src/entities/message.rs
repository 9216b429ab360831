// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message rows, keyed by the external UUID carried in the log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub parent_uuid: Option<String>,
    pub is_sidechain: bool,
    pub user_type: Option<String>,
    pub message_type: Option<String>,
    pub message_role: Option<SmolStr>,
    pub model: Option<String>,
    /// Canonical textual form, normalised at ingest time (see
    /// `glossary::coerce_content`). Never re-parsed by downstream readers.
    pub content: Option<String>,
    pub input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub output_tokens: u64,
    pub service_tier: Option<String>,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_assistant(&self) -> bool {
        self.message_role.as_deref() == Some("assistant")
    }
}

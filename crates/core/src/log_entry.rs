// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire schema for a single line of a session log (§6). Required fields are
//! `sessionId`, `timestamp`, `uuid`; everything else is optional and decoded
//! best-effort.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct LogEntryUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    pub service_tier: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEntryMessage {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub role: Option<String>,
    pub model: Option<String>,
    pub content: Option<Value>,
    pub usage: Option<LogEntryUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub uuid: String,
    #[serde(rename = "parentUuid")]
    pub parent_uuid: Option<String>,
    #[serde(rename = "isSidechain", default)]
    pub is_sidechain: bool,
    #[serde(rename = "userType")]
    pub user_type: Option<String>,
    pub cwd: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
    pub message: Option<LogEntryMessage>,
}

/// Lightweight check for whether a raw JSON line carries the two fields
/// that qualify it as a countable entry rather than an informational
/// "summary" line, ahead of the full, fallible decode into [`LogEntry`].
pub fn looks_like_entry(value: &Value) -> bool {
    value.get("sessionId").and_then(Value::as_str).is_some()
        && value.get("timestamp").is_some()
}

#[cfg(test)]
#[path = "log_entry_tests.rs"]
mod tests;

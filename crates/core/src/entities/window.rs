// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling usage windows and their many-to-many link to messages (§3, §4.D).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies a rolling five-hour usage window.
    pub struct SessionWindowId("win-");
}

crate::define_id! {
    /// Identifies a window/message link row.
    pub struct WindowMessageId("wml-");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub id: SessionWindowId,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub reset_time: DateTime<Utc>,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
    /// Assistant-role linked messages only.
    pub message_count: u64,
    /// Distinct `session_id` over all linked messages.
    pub session_count: u64,
    pub total_cost: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionWindow {
    /// True if `t` falls in the half-open interval `[window_start, window_end)`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.window_start <= t && t < self.window_end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMessage {
    pub id: WindowMessageId,
    pub session_window_id: SessionWindowId,
    pub message_id: String,
    pub created_at: DateTime<Utc>,
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state built from WAL replay.

mod file_sync;
mod jobs;
mod messages;
mod projects;
mod sessions;
mod windows;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use trk_core::entities::{
    FileSyncState, Job, JobId, Message, Project, ProjectId, Session, SessionWindow,
    SessionWindowId, WindowMessage,
};
use trk_core::Event;

/// Materialized state derived from applying every WAL event in order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub projects: HashMap<ProjectId, Project>,
    pub sessions: HashMap<String, Session>,
    pub messages: HashMap<String, Message>,
    pub windows: HashMap<SessionWindowId, SessionWindow>,
    pub window_messages: Vec<WindowMessage>,
    pub file_sync: HashMap<String, FileSyncState>,
    pub jobs: HashMap<JobId, Job>,
}

impl MaterializedState {
    /// Window that a given message is linked to, if any (§3: a message
    /// belongs to at most one window).
    pub fn window_for_message(&self, message_id: &str) -> Option<SessionWindowId> {
        self.window_messages
            .iter()
            .find(|wm| wm.message_id == message_id)
            .map(|wm| wm.session_window_id)
    }

    /// All messages currently linked to `window_id`.
    pub fn messages_in_window(&self, window_id: SessionWindowId) -> Vec<&Message> {
        self.window_messages
            .iter()
            .filter(|wm| wm.session_window_id == window_id)
            .filter_map(|wm| self.messages.get(&wm.message_id))
            .collect()
    }

    /// The `is_active=true` window with the greatest `window_start`, if any.
    pub fn active_window(&self) -> Option<&SessionWindow> {
        self.windows
            .values()
            .filter(|w| w.is_active)
            .max_by_key(|w| w.window_start)
    }

    /// Apply an event to derive the next state.
    ///
    /// All handlers must be idempotent: applying the same event twice
    /// (e.g. because a crash replays part of the WAL twice against a stale
    /// snapshot) must leave the state exactly as applying it once would.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::ProjectUpserted { .. } => projects::apply(self, event),
            Event::SessionUpserted { .. } => sessions::apply(self, event),
            Event::MessageUpserted { .. } => messages::apply(self, event),
            Event::WindowCreated { .. }
            | Event::WindowStatsUpdated { .. }
            | Event::WindowMessageLinked { .. }
            | Event::WindowsReset => windows::apply(self, event),
            Event::FileSyncStateUpdated { .. } | Event::FileSyncStateDeleted { .. } => {
                file_sync::apply(self, event)
            }
            Event::JobCreated { .. }
            | Event::JobStatusChanged { .. }
            | Event::JobLogsUpdated { .. }
            | Event::JobDeleted { .. } => jobs::apply(self, event),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

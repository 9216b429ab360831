// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-sync cursor operations (§4.B).

use chrono::{DateTime, Duration, Utc};
use trk_core::entities::SyncStatus;
use trk_core::{Clock, CoreResult, Event, FileSyncState};

use super::Store;

/// Stale `processing` rows older than this are reset to `pending`.
const STALE_PROCESSING_THRESHOLD: Duration = Duration::minutes(5);

impl<C: Clock> Store<C> {
    pub fn file_sync_state(&self, file_path: &str) -> Option<FileSyncState> {
        self.state.file_sync.get(file_path).cloned()
    }

    /// True if `file_path` has never been synced, its mtime/size has
    /// changed since the last sync, or its prior sync left it in
    /// `processing`/`error`.
    pub fn needs_processing(
        &self,
        file_path: &str,
        mtime: DateTime<Utc>,
        size: u64,
    ) -> (bool, Option<FileSyncState>) {
        match self.state.file_sync.get(file_path) {
            None => (true, None),
            Some(prior) => {
                let stale = prior.last_modified != mtime
                    || prior.file_size != size
                    || matches!(prior.sync_status, SyncStatus::Processing | SyncStatus::Error);
                (stale, Some(prior.clone()))
            }
        }
    }

    /// Upsert `row`, preserving the original `created_at` and refreshing
    /// `updated_at`/`last_sync_time` to the current clock time.
    pub fn update_file_sync_state(&mut self, mut row: FileSyncState) -> CoreResult<()> {
        let now = self.clock.now_utc();
        if let Some(existing) = self.state.file_sync.get(&row.file_path) {
            row.created_at = existing.created_at;
        }
        row.updated_at = now;
        row.last_sync_time = now;
        self.emit(Event::FileSyncStateUpdated { state: row })
    }

    pub fn reset_file_sync_state(&mut self, file_path: &str) -> CoreResult<()> {
        self.emit(Event::FileSyncStateDeleted { file_path: file_path.to_string() })
    }

    /// Resets stale `processing` rows to `pending` and deletes rows for
    /// files that no longer exist. Both passes are best-effort: a failure
    /// on one row is logged and does not abort the rest of the sweep.
    pub fn cleanup_file_sync_state(&mut self, file_exists: impl Fn(&str) -> bool) {
        let now = self.clock.now_utc();

        let stale: Vec<FileSyncState> = self
            .state
            .file_sync
            .values()
            .filter(|row| {
                row.sync_status == SyncStatus::Processing
                    && now - row.last_sync_time > STALE_PROCESSING_THRESHOLD
            })
            .cloned()
            .collect();
        for mut row in stale {
            row.sync_status = SyncStatus::Pending;
            row.error_message = Some("reset: stale processing state".to_string());
            if let Err(err) = self.update_file_sync_state(row) {
                tracing::warn!(error = %err, "failed to reset stale file-sync state");
            }
        }

        let missing: Vec<String> = self
            .state
            .file_sync
            .keys()
            .filter(|path| !file_exists(path))
            .cloned()
            .collect();
        for path in missing {
            if let Err(err) = self.reset_file_sync_state(&path) {
                tracing::warn!(error = %err, file = %path, "failed to delete file-sync state for missing file");
            }
        }
    }
}

#[cfg(test)]
#[path = "file_sync_tests.rs"]
mod tests;

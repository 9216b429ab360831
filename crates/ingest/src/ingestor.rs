// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The differential log ingestor (§4.E): wires discovery, the per-file
//! cursor in `trk_storage`, and the line scanner together into one
//! `sync_all` pass callers can run on a timer or in response to
//! filesystem notifications.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use trk_core::entities::SyncStatus;
use trk_core::{Clock, CoreResult, FileSyncState};
use trk_storage::Store;

use crate::discovery::{discover_log_files, FileInfo};
use crate::scanner::scan_file;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub processed: u64,
    pub skipped: u64,
    pub errored: u64,
    pub entries: u64,
}

enum SyncOutcome {
    Skipped,
    Processed { new_entries: u64 },
    Errored,
}

/// Runs the per-file sync algorithm against a store shared with the rest
/// of the process (§5: "the store handle is shared").
pub struct Ingestor<C: Clock> {
    store: Arc<Mutex<Store<C>>>,
    log_root: PathBuf,
}

impl<C: Clock> Ingestor<C> {
    pub fn new(store: Arc<Mutex<Store<C>>>, log_root: impl Into<PathBuf>) -> Self {
        Self { store, log_root: log_root.into() }
    }

    pub fn store(&self) -> &Arc<Mutex<Store<C>>> {
        &self.store
    }

    /// Run the per-file algorithm (§4.E steps 1-6) over every file
    /// discovered under the log root.
    pub fn sync_all(&mut self) -> CoreResult<IngestSummary> {
        let mut summary = IngestSummary::default();
        for file in discover_log_files(&self.log_root) {
            match self.sync_file(&file)? {
                SyncOutcome::Skipped => summary.skipped += 1,
                SyncOutcome::Processed { new_entries } => {
                    summary.processed += 1;
                    summary.entries += new_entries;
                }
                SyncOutcome::Errored => summary.errored += 1,
            }
        }
        Ok(summary)
    }

    fn sync_file(&mut self, file: &FileInfo) -> CoreResult<SyncOutcome> {
        let path = file.path.to_string_lossy().to_string();
        let mut store = self.store.lock();
        let (needed, prior) = store.needs_processing(&path, file.modtime, file.size);
        if !needed {
            return Ok(SyncOutcome::Skipped);
        }

        let now = store.clock().now_utc();
        let prior_last_line = prior.as_ref().map(|p| p.last_processed_line).unwrap_or(0);

        let mut processing = prior.unwrap_or_else(|| FileSyncState::fresh(&path, now));
        processing.sync_status = SyncStatus::Processing;
        processing.last_processed_line = prior_last_line;
        store.update_file_sync_state(processing)?;

        match scan_file(&file.path, prior_last_line) {
            Ok(outcome) => {
                let new_entries = outcome.entries.len() as u64;
                for entry in &outcome.entries {
                    store.process_log_entry(entry, &file.project_dir_name)?;
                }

                let mut completed = store.file_sync_state(&path).unwrap_or_else(|| FileSyncState::fresh(&path, now));
                completed.sync_status = SyncStatus::Completed;
                completed.last_processed_line = outcome.lines_consumed;
                completed.last_modified = file.modtime;
                completed.file_size = file.size;
                completed.error_message = None;
                store.update_file_sync_state(completed)?;

                Ok(SyncOutcome::Processed { new_entries })
            }
            Err(scan_err) => {
                tracing::warn!(file = %path, error = %scan_err, "log scanner error, marking file errored");
                let mut errored = store.file_sync_state(&path).unwrap_or_else(|| FileSyncState::fresh(&path, now));
                errored.sync_status = SyncStatus::Error;
                errored.error_message = Some(scan_err.to_string());
                store.update_file_sync_state(errored)?;
                Ok(SyncOutcome::Errored)
            }
        }
    }
}

#[cfg(test)]
#[path = "ingestor_tests.rs"]
mod tests;

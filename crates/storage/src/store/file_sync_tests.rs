// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration as StdDuration;

use chrono::Utc;
use tempfile::tempdir;
use trk_core::entities::{FileSyncState, SyncStatus};
use trk_core::{pricing::zero_pricing, Clock, FakeClock};

use super::Store;

fn open_store(dir: &std::path::Path, clock: FakeClock) -> Store<FakeClock> {
    Store::open(dir.join("wal.log"), dir.join("state.snapshot"), clock, zero_pricing()).expect("open store")
}

#[test]
fn needs_processing_is_true_for_unseen_file() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path(), FakeClock::new());
    let (needed, prior) = store.needs_processing("/logs/a.jsonl", Utc::now(), 10);
    assert!(needed);
    assert!(prior.is_none());
}

#[test]
fn needs_processing_is_false_when_mtime_and_size_match() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let mut store = open_store(dir.path(), clock);
    let now = Utc::now();
    let mut row = FileSyncState::fresh("/logs/a.jsonl", now);
    row.sync_status = SyncStatus::Completed;
    row.last_modified = now;
    row.file_size = 128;
    store.update_file_sync_state(row).expect("update");

    let (needed, prior) = store.needs_processing("/logs/a.jsonl", now, 128);
    assert!(!needed);
    assert!(prior.is_some());
}

#[test]
fn needs_processing_is_true_when_size_changed() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(dir.path(), FakeClock::new());
    let now = Utc::now();
    let mut row = FileSyncState::fresh("/logs/a.jsonl", now);
    row.sync_status = SyncStatus::Completed;
    row.file_size = 128;
    store.update_file_sync_state(row).expect("update");

    let (needed, _) = store.needs_processing("/logs/a.jsonl", now, 256);
    assert!(needed);
}

#[test]
fn needs_processing_is_true_when_sync_status_is_processing_or_error() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(dir.path(), FakeClock::new());
    let now = Utc::now();
    let mut row = FileSyncState::fresh("/logs/a.jsonl", now);
    row.sync_status = SyncStatus::Error;
    store.update_file_sync_state(row).expect("update");

    let (needed, _) = store.needs_processing("/logs/a.jsonl", now, 0);
    assert!(needed);
}

#[test]
fn update_preserves_created_at_across_upserts() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let mut store = open_store(dir.path(), clock.clone());
    let first_created = clock.now_utc();
    store.update_file_sync_state(FileSyncState::fresh("/logs/a.jsonl", first_created)).expect("update");

    clock.advance(StdDuration::from_secs(60));
    let mut second = FileSyncState::fresh("/logs/a.jsonl", clock.now_utc());
    second.last_processed_line = 10;
    store.update_file_sync_state(second).expect("update");

    let stored = store.file_sync_state("/logs/a.jsonl").expect("present");
    assert_eq!(stored.created_at, first_created);
    assert_eq!(stored.last_processed_line, 10);
}

#[test]
fn cleanup_resets_stale_processing_rows() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let mut store = open_store(dir.path(), clock.clone());
    let mut row = FileSyncState::fresh("/logs/a.jsonl", clock.now_utc());
    row.sync_status = SyncStatus::Processing;
    store.update_file_sync_state(row).expect("update");

    clock.advance(StdDuration::from_secs(6 * 60));
    store.cleanup_file_sync_state(|_| true);

    let stored = store.file_sync_state("/logs/a.jsonl").expect("present");
    assert_eq!(stored.sync_status, SyncStatus::Pending);
    assert!(stored.error_message.is_some());
}

#[test]
fn cleanup_deletes_rows_for_missing_files() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(dir.path(), FakeClock::new());
    store.update_file_sync_state(FileSyncState::fresh("/logs/gone.jsonl", Utc::now())).expect("update");

    store.cleanup_file_sync_state(|_| false);
    assert!(store.file_sync_state("/logs/gone.jsonl").is_none());
}

#[test]
fn reset_deletes_state_to_force_full_reprocess() {
    let dir = tempdir().expect("tempdir");
    let mut store = open_store(dir.path(), FakeClock::new());
    store.update_file_sync_state(FileSyncState::fresh("/logs/a.jsonl", Utc::now())).expect("update");
    store.reset_file_sync_state("/logs/a.jsonl").expect("reset");
    assert!(store.file_sync_state("/logs/a.jsonl").is_none());
}

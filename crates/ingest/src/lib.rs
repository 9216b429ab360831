// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trk-ingest: the differential log ingestor (§4.E). Discovers per-project
//! JSONL session logs under a configured root, resumes each from its
//! `trk_storage` file-sync cursor, and feeds decoded entries into
//! `Store::process_log_entry`.

pub mod discovery;
pub mod ingestor;
pub mod scanner;
pub mod watch;

pub use discovery::{discover_log_files, FileInfo};
pub use ingestor::{IngestSummary, Ingestor};
pub use scanner::{scan_file, ScanOutcome};
pub use watch::{run_watch_loop, spawn_fs_watcher};

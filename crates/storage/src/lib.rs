// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trk-storage: the durable WAL-backed store (§2 component A) and the
//! primitive operations layered directly on it — file-sync cursors
//! (§4.B), the window aggregator (§4.D), differential-ingest's
//! `processLogEntry` (§4.E), and raw job persistence (the storage half of
//! §4.F).

pub mod snapshot;
pub mod state;
pub mod store;
pub mod wal;

pub use state::MaterializedState;
pub use store::{JobFilters, Store};
pub use wal::{Wal, WalEntry};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persistent store (§2 component A): a WAL-backed, single-writer
//! handle that the rest of the engine calls into. Every mutation goes
//! through [`Store::emit`] so the WAL and the in-memory materialized state
//! can never drift apart.

mod file_sync;
mod ingest;
mod jobs;
mod window;

use std::path::{Path, PathBuf};

use trk_core::{Clock, CoreResult, Event, PricingFn, SystemClock};

use crate::snapshot;
use crate::state::MaterializedState;
use crate::wal::Wal;

pub use jobs::JobFilters;

/// How many WAL entries accumulate between automatic snapshots. Chosen to
/// bound replay time on restart without snapshotting on every single event.
const SNAPSHOT_INTERVAL: u64 = 500;

pub struct Store<C: Clock = SystemClock> {
    wal: Wal,
    state: MaterializedState,
    snapshot_path: PathBuf,
    last_snapshot_at: u64,
    clock: C,
    pricing: PricingFn,
}

impl<C: Clock> Store<C> {
    /// Open (or create) the store at `wal_path`, restoring from
    /// `snapshot_path` if one exists and replaying any WAL entries written
    /// after its watermark.
    pub fn open(
        wal_path: impl AsRef<Path>,
        snapshot_path: impl AsRef<Path>,
        clock: C,
        pricing: PricingFn,
    ) -> CoreResult<Self> {
        let snapshot_path = snapshot_path.as_ref().to_path_buf();
        let (mut state, seq) = match snapshot::load(&snapshot_path)? {
            Some((state, seq)) => (state, seq),
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(wal_path, seq)?;
        for entry in wal.entries_after(seq)? {
            state.apply_event(&entry.event);
        }
        let last_snapshot_at = wal.write_seq();

        Ok(Self { wal, state, snapshot_path, last_snapshot_at, clock, pricing })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Read-only view of the current materialized state, for callers that
    /// only need to inspect rows (list/get operations).
    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Append `event` to the WAL and apply it to the materialized state in
    /// the same call, flushing and snapshotting as the configured
    /// thresholds demand.
    fn emit(&mut self, event: Event) -> CoreResult<()> {
        self.state.apply_event(&event);
        self.wal.append(&event)?;
        if self.wal.needs_flush() {
            self.wal.flush()?;
        }
        if self.wal.write_seq() - self.last_snapshot_at >= SNAPSHOT_INTERVAL {
            self.save_snapshot()?;
        }
        Ok(())
    }

    /// Force a snapshot now and compact the WAL to entries written since it.
    pub fn save_snapshot(&mut self) -> CoreResult<()> {
        self.wal.flush()?;
        let seq = self.wal.write_seq();
        snapshot::save(&self.snapshot_path, &self.state, seq)?;
        self.wal.truncate_before(seq + 1)?;
        self.last_snapshot_at = seq;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

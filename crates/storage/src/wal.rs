// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of [`Event`]s.
//!
//! Every store mutation is appended here before (and in the same call as)
//! being applied to `MaterializedState`. On restart the store replays
//! everything after the last snapshot's watermark. Corruption at the tail
//! of the file (a torn write from a crash mid-append) is tolerated: the
//! valid prefix is kept, the original file is rotated to `.bak`, and the
//! corrupt tail is dropped rather than failing startup.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use trk_core::Event;

/// Number of buffered appends that forces a flush regardless of elapsed time.
const FLUSH_COUNT_THRESHOLD: u64 = 100;
/// Elapsed time since the last flush that forces one even under the count threshold.
const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
/// How many rotated backups of a corrupt WAL to retain (`.bak`, `.bak.2`, `.bak.3`).
const MAX_BACKUPS: u8 = 3;

#[derive(Debug, Clone)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
    /// All entries currently retained (possibly a suffix, after `truncate_before`).
    entries: Vec<(u64, Event)>,
    write_seq: u64,
    processed_seq: u64,
    read_seq: u64,
    unflushed: u64,
    last_flush: Instant,
}

impl Wal {
    /// Open (or create) the WAL at `path`. `processed_seq` is the watermark
    /// recovered from the last snapshot; `next_unprocessed` starts reading
    /// just after it.
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = if path.exists() { fs::read(&path)? } else { Vec::new() };

        let (valid, corrupt) = parse_valid_prefix(&raw);

        if corrupt {
            rotate_backups(&path)?;
            fs::rename(&path, backup_path(&path, 0))?;
            let mut rewritten = String::new();
            for event in &valid {
                rewritten.push_str(&serde_json::to_string(event).unwrap_or_default());
                rewritten.push('\n');
            }
            fs::write(&path, rewritten)?;
        } else if !path.exists() {
            fs::write(&path, "")?;
        }

        let entries: Vec<(u64, Event)> =
            valid.into_iter().enumerate().map(|(i, e)| (i as u64 + 1, e)).collect();
        let write_seq = entries.len() as u64;

        let file = OpenOptions::new().append(true).create(true).open(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            entries,
            write_seq,
            processed_seq,
            read_seq: processed_seq,
            unflushed: 0,
            last_flush: Instant::now(),
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append `event`, returning its assigned sequence number. Buffered;
    /// call [`Wal::flush`] (or wait for [`Wal::needs_flush`]) for durability.
    pub fn append(&mut self, event: &Event) -> std::io::Result<u64> {
        let line = serde_json::to_string(event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.write_seq += 1;
        self.entries.push((self.write_seq, event.clone()));
        self.unflushed += 1;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unflushed = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.unflushed >= FLUSH_COUNT_THRESHOLD
            || (self.unflushed > 0 && self.last_flush.elapsed() >= FLUSH_INTERVAL)
    }

    /// Returns the entry immediately after the read cursor, advancing it.
    pub fn next_unprocessed(&mut self) -> std::io::Result<Option<WalEntry>> {
        let target = self.read_seq + 1;
        if let Some((seq, event)) = self.entries.iter().find(|(s, _)| *s == target) {
            self.read_seq = *seq;
            return Ok(Some(WalEntry { seq: *seq, event: event.clone() }));
        }
        Ok(None)
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// All entries with `seq > from_seq`, in order.
    pub fn entries_after(&self, from_seq: u64) -> std::io::Result<Vec<WalEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|(seq, _)| *seq > from_seq)
            .map(|(seq, event)| WalEntry { seq: *seq, event: event.clone() })
            .collect())
    }

    /// Drop entries with `seq < keep_from` and rewrite the file to match,
    /// typically called right after a snapshot makes them redundant.
    pub fn truncate_before(&mut self, keep_from: u64) -> std::io::Result<()> {
        self.entries.retain(|(seq, _)| *seq >= keep_from);

        let mut rewritten = String::new();
        for (_, event) in &self.entries {
            rewritten.push_str(&serde_json::to_string(event).unwrap_or_default());
            rewritten.push('\n');
        }
        fs::write(&self.path, rewritten)?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }
}

/// Parse as many whole, valid JSON lines as possible from `raw`. Returns the
/// valid events plus whether the content was corrupt (non-UTF-8, or a line
/// that failed to parse before EOF).
fn parse_valid_prefix(raw: &[u8]) -> (Vec<Event>, bool) {
    let Ok(text) = std::str::from_utf8(raw) else {
        return (Vec::new(), true);
    };

    let mut valid = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(line) {
            Ok(event) => valid.push(event),
            Err(_) => return (valid, true),
        }
    }
    (valid, false)
}

fn backup_path(path: &Path, round: u8) -> PathBuf {
    if round == 0 {
        path.with_extension("bak")
    } else {
        path.with_extension(format!("bak.{}", round + 1))
    }
}

/// Shift any existing `.bak`, `.bak.2` chain one slot up, evicting the oldest.
fn rotate_backups(path: &Path) -> std::io::Result<()> {
    let oldest = backup_path(path, MAX_BACKUPS - 1);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for round in (0..MAX_BACKUPS - 1).rev() {
        let from = backup_path(path, round);
        let to = backup_path(path, round + 1);
        if from.exists() {
            fs::rename(&from, &to)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;

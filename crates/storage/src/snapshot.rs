// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic materialized-state snapshots.
//!
//! A snapshot lets recovery skip replaying the entire WAL from empty state:
//! on startup the store loads the newest snapshot, then replays only the
//! WAL entries written after the snapshot's watermark sequence. The
//! snapshot body is zstd-compressed JSON; the watermark travels alongside
//! it in a small header so the WAL knows where to resume.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::state::MaterializedState;

const ZSTD_LEVEL: i32 = 3;

#[derive(Serialize, Deserialize)]
struct SnapshotHeader {
    seq: u64,
}

/// Write `state` (as of WAL sequence `seq`) to `path`, replacing any
/// existing snapshot atomically via a rename.
pub fn save(path: impl AsRef<Path>, state: &MaterializedState, seq: u64) -> std::io::Result<()> {
    let path = path.as_ref();
    let header = serde_json::to_vec(&SnapshotHeader { seq })
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let body = serde_json::to_vec(state)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut payload = Vec::with_capacity(8 + header.len() + body.len());
    payload.extend_from_slice(&(header.len() as u32).to_le_bytes());
    payload.extend_from_slice(&header);
    payload.extend_from_slice(&body);

    let compressed = zstd::encode_all(payload.as_slice(), ZSTD_LEVEL)?;

    let tmp_path = path.with_extension("snapshot.tmp");
    {
        let mut f = std::fs::File::create(&tmp_path)?;
        f.write_all(&compressed)?;
        f.sync_data()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load the snapshot at `path`, if one exists. Returns `(state, seq)`.
pub fn load(path: impl AsRef<Path>) -> std::io::Result<Option<(MaterializedState, u64)>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let mut compressed = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut compressed)?;
    if compressed.is_empty() {
        return Ok(None);
    }

    let payload = zstd::decode_all(compressed.as_slice())?;
    if payload.len() < 4 {
        return Ok(None);
    }
    let header_len = u32::from_le_bytes(payload[0..4].try_into().unwrap_or([0; 4])) as usize;
    let header_bytes = payload.get(4..4 + header_len).unwrap_or(&[]);
    let body_bytes = payload.get(4 + header_len..).unwrap_or(&[]);

    let header: SnapshotHeader = serde_json::from_slice(header_bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let state: MaterializedState = serde_json::from_slice(body_bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(Some((state, header.seq)))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

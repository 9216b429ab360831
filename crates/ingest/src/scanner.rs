// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-file line scanner (§4.E steps 3-4): skip lines already
//! consumed, then decode whatever full lines follow. Tolerates lines up
//! to 10 MiB; a line beyond that is a scanner error, which aborts the
//! file (the caller marks it `error` and moves on to the next one).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use trk_core::LogEntry;

/// Lines longer than this abort the scan with an error rather than
/// buffering an unbounded amount of memory.
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

pub struct ScanOutcome {
    pub entries: Vec<LogEntry>,
    /// Total line count consumed, `skip_lines` included. Becomes the
    /// file's new `last_processed_line`.
    pub lines_consumed: u64,
}

/// Skip the first `skip_lines` complete lines of `path`, then decode every
/// remaining complete line as a log entry. An incomplete trailing line
/// (no terminating newline yet, e.g. the writer is mid-flush) is left
/// unconsumed for the next pass.
pub fn scan_file(path: &Path, skip_lines: u64) -> std::io::Result<ScanOutcome> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut lines_consumed = 0u64;

    for _ in 0..skip_lines {
        buf.clear();
        if read_bounded_line(&mut reader, &mut buf)? == 0 {
            // File is shorter than the recorded cursor; nothing new to read.
            return Ok(ScanOutcome { entries: Vec::new(), lines_consumed: skip_lines });
        }
        lines_consumed += 1;
    }

    let mut entries = Vec::new();
    loop {
        buf.clear();
        let n = read_bounded_line(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        if !buf.ends_with(b"\n") {
            // Incomplete final line; wait for the writer to finish it.
            break;
        }
        lines_consumed += 1;

        let trimmed = trim_newline(&buf);
        if trimmed.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(trimmed) else {
            continue;
        };
        if !trk_core::log_entry::looks_like_entry(&value) {
            // Summary entries and other informational lines in the source format.
            continue;
        }
        if let Ok(entry) = serde_json::from_value::<LogEntry>(value) {
            entries.push(entry);
        }
    }

    Ok(ScanOutcome { entries, lines_consumed })
}

fn read_bounded_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> std::io::Result<usize> {
    let n = reader.read_until(b'\n', buf)?;
    if buf.len() > MAX_LINE_BYTES {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "log line exceeds 10 MiB limit"));
    }
    Ok(n)
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && buf[end - 1] == b'\r' {
        end -= 1;
    }
    &buf[..end]
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File discovery (§4.E): glob `*.jsonl` under each immediate subdirectory
//! of the configured log root. Each subdirectory is named after its
//! project in the dash-encoded convention described in the glossary, and
//! that name doubles as the fallback project name for files inside it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// One candidate log file found under the log root.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub modtime: DateTime<Utc>,
    pub size: u64,
    /// Name of the immediate subdirectory the file lives in; used as
    /// `fallback_project_name` when the log entries themselves carry no `cwd`.
    pub project_dir_name: String,
}

/// List every `*.jsonl` file one level below `root`, skipping anything
/// that isn't readable rather than failing the whole scan.
pub fn discover_log_files(root: &std::path::Path) -> Vec<FileInfo> {
    let mut files = Vec::new();
    let Ok(subdirs) = std::fs::read_dir(root) else {
        return files;
    };

    for subdir_entry in subdirs.filter_map(|e| e.ok()) {
        let subdir_path = subdir_entry.path();
        if !subdir_path.is_dir() {
            continue;
        }
        let project_dir_name = subdir_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let Ok(entries) = std::fs::read_dir(&subdir_path) else {
            continue;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "jsonl") {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let modtime = metadata
                .modified()
                .ok()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(Utc::now);
            files.push(FileInfo { path, modtime, size: metadata.len(), project_dir_name: project_dir_name.clone() });
        }
    }
    files
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;

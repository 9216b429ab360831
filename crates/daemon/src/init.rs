// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide initialization record (§4.I). Startup runs the WAL replay
//! and initial ingest sync before the daemon is ready to accept work; while
//! that's in progress, callers polling readiness see `initializing` rather
//! than a stale or default status.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    Initializing,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct InitializationSnapshot {
    pub status: InitStatus,
    pub message: String,
    pub progress: Option<f32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

struct Inner {
    status: InitStatus,
    message: String,
    progress: Option<f32>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// Guarded by a read/write lock (§5): readers (status queries) never block
/// each other, only the rare mutator.
pub struct InitializationState {
    inner: RwLock<Inner>,
}

impl InitializationState {
    /// Begin initializing, timestamped `now`.
    pub fn start(now: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                status: InitStatus::Initializing,
                message: message.into(),
                progress: None,
                start_time: now,
                end_time: None,
                error: None,
            }),
        }
    }

    pub fn update_progress(&self, progress: f32, message: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.progress = Some(progress);
        inner.message = message.into();
    }

    pub fn complete(&self, now: DateTime<Utc>, message: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.status = InitStatus::Completed;
        inner.message = message.into();
        inner.progress = Some(1.0);
        inner.end_time = Some(now);
    }

    pub fn fail(&self, now: DateTime<Utc>, error: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.status = InitStatus::Failed;
        inner.error = Some(error.into());
        inner.end_time = Some(now);
    }

    pub fn snapshot(&self) -> InitializationSnapshot {
        let inner = self.inner.read();
        InitializationSnapshot {
            status: inner.status.clone(),
            message: inner.message.clone(),
            progress: inner.progress,
            start_time: inner.start_time,
            end_time: inner.end_time,
            error: inner.error.clone(),
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.inner.read().status == InitStatus::Initializing
    }

    /// Reject a synchronous entry point while still initializing (§4.I).
    pub fn guard_ready(&self) -> Result<(), &'static str> {
        if self.is_initializing() {
            Err("system initializing")
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;

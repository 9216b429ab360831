// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem notification wiring for the ingestor. Mirrors the
//! adapters' agent watcher: a `notify` watcher feeds a channel that wakes
//! a `select!` loop, with a timer as a fallback for filesystems or
//! editors whose writes `notify` misses.

use std::path::Path;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};

use trk_core::Clock;

use crate::ingestor::Ingestor;

/// Start a recursive watch on `root`. Returns the watcher (drop it to stop
/// watching) and a receiver that fires once per batch of filesystem
/// events observed.
pub fn spawn_fs_watcher(root: &Path) -> notify::Result<(RecommendedWatcher, mpsc::Receiver<()>)> {
    let (tx, rx) = mpsc::channel(32);
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if res.is_ok() {
            let _ = tx.blocking_send(());
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok((watcher, rx))
}

/// Run `ingestor.sync_all()` on startup, then again every time `file_rx`
/// fires or `poll_interval` elapses, until `shutdown_rx` resolves.
pub async fn run_watch_loop<C: Clock>(
    mut ingestor: Ingestor<C>,
    mut file_rx: Option<mpsc::Receiver<()>>,
    poll_interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    if let Err(err) = ingestor.sync_all() {
        tracing::error!(error = %err, "initial ingest sync failed");
    }

    loop {
        tokio::select! {
            Some(_) = async {
                match file_rx {
                    Some(ref mut rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                if let Err(err) = ingestor.sync_all() {
                    tracing::error!(error = %err, "ingest sync failed after filesystem notification");
                }
            }

            _ = tokio::time::sleep(poll_interval) => {
                if let Err(err) = ingestor.sync_all() {
                    tracing::error!(error = %err, "ingest sync failed on poll tick");
                }
            }

            _ = &mut shutdown_rx => {
                tracing::debug!("ingest watch loop shutdown requested");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (§6 Configuration Knobs): fixed paths under a state
//! directory plus the tunables the executor and scheduler accept, all
//! overridable via environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_WORKER_COUNT: usize = 4;
const DEFAULT_SCHEDULER_TICK: Duration = Duration::from_secs(60);
const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory (set TRACKERD_STATE_DIR)")]
    NoStateDir,
}

/// Everything the daemon needs to start: where its store and logs live,
/// where to discover session logs, and the executor/scheduler tunables.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub log_root: PathBuf,
    pub worker_count: usize,
    pub scheduler_tick: Duration,
    pub job_timeout: Duration,
    pub queue_capacity: usize,
}

impl Config {
    /// Resolve configuration from the environment (§6). Directories are not
    /// created here; the caller creates them as part of startup.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        let log_root = log_root(&state_dir)?;

        Ok(Self {
            wal_path: state_dir.join("trackerd.wal"),
            snapshot_path: state_dir.join("trackerd.snapshot"),
            lock_path: state_dir.join("trackerd.pid"),
            log_path: state_dir.join("trackerd.log"),
            log_root,
            worker_count: env_usize("TRACKERD_WORKER_COUNT").unwrap_or(DEFAULT_WORKER_COUNT),
            scheduler_tick: env_duration_ms("TRACKERD_SCHEDULER_TICK_MS").unwrap_or(DEFAULT_SCHEDULER_TICK),
            job_timeout: env_duration_secs("TRACKERD_JOB_TIMEOUT_SECS").unwrap_or(DEFAULT_JOB_TIMEOUT),
            queue_capacity: env_usize("TRACKERD_QUEUE_CAPACITY").unwrap_or(DEFAULT_QUEUE_CAPACITY),
            state_dir,
        })
    }
}

/// Resolve the daemon's own state directory: `TRACKERD_STATE_DIR` >
/// `XDG_STATE_HOME/trackerd` > `~/.trackerd`.
fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("TRACKERD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("trackerd"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".trackerd"))
}

/// Resolve where to discover session logs: `TRACKERD_LOG_ROOT` > the
/// assistant CLI's own log directory (§6: `${HOME}/<vendor>/projects`).
fn log_root(state_dir: &std::path::Path) -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("TRACKERD_LOG_ROOT") {
        return Ok(PathBuf::from(dir));
    }
    match std::env::var("HOME") {
        Ok(home) => Ok(PathBuf::from(home).join(".claude").join("projects")),
        Err(_) => Ok(state_dir.join("projects")),
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn env_duration_ms(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

fn env_duration_secs(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_secs)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

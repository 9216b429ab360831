// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler (§4.H): bridges window-reset detection and clock-based
//! due times to the executor's queue. Each tick is two independent passes;
//! both tolerate a transient store error with a bounded retry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex as SyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use trk_core::entities::{Job, JobStatus, ScheduleType};
use trk_core::error::is_transient_error;
use trk_core::{Clock, CoreResult};
use trk_storage::{JobFilters, Store};

use crate::executor::Executor;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_interval: Duration::from_secs(60), retry_attempts: 3, retry_backoff: Duration::from_secs(5) }
    }
}

pub struct Scheduler<C: Clock> {
    store: Arc<SyncMutex<Store<C>>>,
    executor: Arc<Executor<C>>,
    config: SchedulerConfig,
    last_observed_reset: SyncMutex<Option<DateTime<Utc>>>,
    shutdown: CancellationToken,
    handle: SyncMutex<Option<JoinHandle<()>>>,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(store: Arc<SyncMutex<Store<C>>>, executor: Arc<Executor<C>>, config: SchedulerConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            executor,
            config,
            last_observed_reset: SyncMutex::new(None),
            shutdown: CancellationToken::new(),
            handle: SyncMutex::new(None),
        })
    }

    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run().await });
        *self.handle.lock() = Some(handle);
    }

    pub async fn stop(&self) {
        self.shutdown.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    /// Run both scheduling passes once. Exposed directly so tests can drive
    /// the logic without waiting on the background ticker.
    pub async fn tick(&self) {
        self.queue_after_reset_jobs().await;
        self.queue_due_clock_jobs().await;
    }

    async fn with_retry<T>(&self, mut f: impl FnMut() -> CoreResult<T>) -> CoreResult<T> {
        let mut attempt = 0;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(err) if attempt + 1 < self.config.retry_attempts && is_transient_error(&err.to_string()) => {
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Step 1: compare the active window's reset time against the last one
    /// observed; on a change, queue pending `after_reset` jobs ordered
    /// `priority DESC, created_at ASC`. The first-ever observation of an
    /// active window only records its reset time as the baseline — a
    /// window that was already active before this scheduler's first tick
    /// must not look like a rollover.
    async fn queue_after_reset_jobs(&self) {
        let active = match self.with_retry(|| Ok(self.store.lock().get_active_window())).await {
            Ok(active) => active,
            Err(_) => return,
        };
        let Some(window) = active else { return };

        let previously_observed = self.last_observed_reset.lock().replace(window.reset_time);
        match previously_observed {
            None => return,
            Some(prev) if prev == window.reset_time => return,
            Some(_) => {}
        }

        let jobs = match self.with_retry(|| Ok(self.pending_jobs())).await {
            Ok(jobs) => jobs,
            Err(_) => return,
        };
        let mut due: Vec<_> = jobs.into_iter().filter(|job| job.schedule_type == Some(ScheduleType::AfterReset)).collect();
        due.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.created_at.cmp(&b.created_at)));
        for job in due {
            let _ = self.executor.queue(job.id);
        }
    }

    /// Step 2: queue pending `delayed`/`scheduled` jobs whose `scheduled_at`
    /// has arrived, ordered `priority DESC, scheduled_at ASC`.
    async fn queue_due_clock_jobs(&self) {
        let now = self.store.lock().clock().now_utc();
        let jobs = match self.with_retry(|| Ok(self.pending_jobs())).await {
            Ok(jobs) => jobs,
            Err(_) => return,
        };
        let mut due: Vec<_> = jobs
            .into_iter()
            .filter(|job| matches!(job.schedule_type, Some(ScheduleType::Delayed) | Some(ScheduleType::Scheduled)))
            .filter(|job| job.scheduled_at.is_some_and(|at| at <= now))
            .collect();
        due.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.scheduled_at.cmp(&b.scheduled_at)));
        for job in due {
            let _ = self.executor.queue(job.id);
        }
    }

    fn pending_jobs(&self) -> Vec<Job> {
        self.store.lock().list_jobs(&JobFilters { status: Some(JobStatus::Pending), ..Default::default() })
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job executor (§4.G): a fixed worker pool draining a bounded queue,
//! plus a monitor that feeds it pending immediate jobs and reclaims stale
//! `running` rows whose process died or overran its timeout.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use parking_lot::Mutex as SyncMutex;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use trk_core::entities::{JobId, JobStatus, ScheduleType};
use trk_core::{Clock, CommandPolicy, CoreError, CoreResult, PolicyDecision};
use trk_storage::{JobFilters, Store};

use crate::command::build_argv;
use crate::process::{drive_to_completion, graduated_kill, is_pid_running, spawn_child, JobOutcome};

/// How many pending immediate jobs the monitor queues in a single pass
/// (§4.G pass 1).
const MONITOR_QUEUE_BATCH: usize = 10;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full")]
    Full,
    #[error("shutting down")]
    ShuttingDown,
}

/// A running job's cancellation token, plus whether cancellation was
/// forced by the monitor's timeout reclamation (classified as `failed`)
/// rather than an explicit [`Executor::cancel`] call (classified as
/// `cancelled`).
#[derive(Clone)]
struct CancelHandle {
    token: CancellationToken,
    timed_out: Arc<AtomicBool>,
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub job_timeout: Duration,
    pub monitor_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_capacity: 100,
            job_timeout: Duration::from_secs(30 * 60),
            monitor_interval: Duration::from_secs(10),
        }
    }
}

pub struct Executor<C: Clock> {
    store: Arc<SyncMutex<Store<C>>>,
    sender: mpsc::Sender<JobId>,
    receiver: Arc<AsyncMutex<mpsc::Receiver<JobId>>>,
    cancels: Arc<SyncMutex<HashMap<JobId, CancelHandle>>>,
    inflight: Arc<SyncMutex<HashSet<JobId>>>,
    policy: Arc<dyn CommandPolicy>,
    worker_count: usize,
    job_timeout: Duration,
    monitor_interval: Duration,
    stopping: Arc<AtomicBool>,
    shutdown: CancellationToken,
    handles: SyncMutex<Vec<JoinHandle<()>>>,
}

impl<C: Clock + 'static> Executor<C> {
    pub fn new(store: Arc<SyncMutex<Store<C>>>, policy: Arc<dyn CommandPolicy>, config: ExecutorConfig) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        Arc::new(Self {
            store,
            sender,
            receiver: Arc::new(AsyncMutex::new(receiver)),
            cancels: Arc::new(SyncMutex::new(HashMap::new())),
            inflight: Arc::new(SyncMutex::new(HashSet::new())),
            policy,
            worker_count: config.worker_count.max(1),
            job_timeout: config.job_timeout,
            monitor_interval: config.monitor_interval,
            stopping: Arc::new(AtomicBool::new(false)),
            shutdown: CancellationToken::new(),
            handles: SyncMutex::new(Vec::new()),
        })
    }

    /// Spawn the worker pool and the monitor as background tasks.
    pub fn start(self: &Arc<Self>) {
        for idx in 0..self.worker_count {
            let this = Arc::clone(self);
            let handle = tokio::spawn(async move { this.worker_loop(idx).await });
            self.handles.lock().push(handle);
        }
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move { monitor.monitor_loop().await });
        self.handles.lock().push(handle);
    }

    /// Enqueue `id` for execution. Idempotent: queueing an id already
    /// in-flight is a no-op rather than an error.
    pub fn queue(&self, id: JobId) -> Result<(), QueueError> {
        if self.stopping.load(Ordering::Acquire) {
            return Err(QueueError::ShuttingDown);
        }
        {
            let mut inflight = self.inflight.lock();
            if inflight.contains(&id) {
                return Ok(());
            }
            inflight.insert(id);
        }
        match self.sender.try_send(id) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.inflight.lock().remove(&id);
                Err(QueueError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.inflight.lock().remove(&id);
                Err(QueueError::ShuttingDown)
            }
        }
    }

    /// Cancel `id`. A job already running is signalled via its
    /// cancellation token; a job still `pending` (never picked up by a
    /// worker) is cancelled directly. Cancelling a terminal job is a no-op.
    pub fn cancel(&self, id: JobId) -> CoreResult<()> {
        if let Some(handle) = self.cancels.lock().get(&id).cloned() {
            handle.token.cancel();
            return Ok(());
        }
        let mut store = self.store.lock();
        match store.get_job(id) {
            None => Err(CoreError::JobNotFound(id.to_string())),
            Some(job) if job.status == JobStatus::Pending => {
                store.set_job_status(id, JobStatus::Cancelled, None)?;
                drop(store);
                self.inflight.lock().remove(&id);
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    /// Cancel every tracked job and wait for the worker pool and monitor
    /// to drain and exit.
    pub async fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
        for handle in self.cancels.lock().values() {
            handle.token.cancel();
        }
        self.shutdown.cancel();
        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            let _ = handle.await;
        }
    }

    async fn worker_loop(self: Arc<Self>, _idx: usize) {
        loop {
            let next = {
                let mut rx = self.receiver.lock().await;
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => None,
                    item = rx.recv() => item,
                }
            };
            match next {
                Some(id) => self.run_job(id).await,
                None => break,
            }
        }
    }

    async fn run_job(&self, job_id: JobId) {
        let job = {
            let store = self.store.lock();
            store.get_job(job_id)
        };
        let Some(job) = job else {
            self.inflight.lock().remove(&job_id);
            return;
        };
        if job.status != JobStatus::Pending {
            self.inflight.lock().remove(&job_id);
            return;
        }

        if let PolicyDecision::Deny(reason) = self.policy.check(&job.command) {
            let mut store = self.store.lock();
            let _ = store.set_job_logs(job_id, None, Some(reason), None);
            let _ = store.set_job_status(job_id, JobStatus::Failed, None);
            drop(store);
            self.inflight.lock().remove(&job_id);
            return;
        }

        let argv = build_argv(&job.command, job.yolo_mode);
        let spawned = match spawn_child(&argv, &job.execution_directory) {
            Ok(spawned) => spawned,
            Err(err) => {
                let mut store = self.store.lock();
                let _ = store.set_job_logs(job_id, None, Some(format!("failed to start process: {err}")), None);
                let _ = store.set_job_status(job_id, JobStatus::Failed, None);
                drop(store);
                self.inflight.lock().remove(&job_id);
                return;
            }
        };

        let cancel = CancellationToken::new();
        let timed_out = Arc::new(AtomicBool::new(false));
        self.cancels.lock().insert(job_id, CancelHandle { token: cancel.clone(), timed_out: Arc::clone(&timed_out) });
        {
            let mut store = self.store.lock();
            let _ = store.set_job_status(job_id, JobStatus::Running, spawned.pid);
        }

        let outcome = drive_to_completion(spawned.child, cancel).await;
        self.cancels.lock().remove(&job_id);

        {
            let mut store = self.store.lock();
            match outcome {
                JobOutcome::Completed { exit_code, stdout, stderr } => {
                    let _ = store.set_job_logs(job_id, Some(stdout), Some(stderr), Some(exit_code));
                    let _ = store.set_job_status(job_id, JobStatus::Completed, None);
                }
                JobOutcome::Failed { message, stdout, stderr } => {
                    let combined = if stderr.is_empty() { message } else { format!("{stderr}\n{message}") };
                    let _ = store.set_job_logs(job_id, Some(stdout), Some(combined), None);
                    let _ = store.set_job_status(job_id, JobStatus::Failed, None);
                }
                JobOutcome::Cancelled { stdout, stderr } if timed_out.load(Ordering::Acquire) => {
                    let minutes = self.job_timeout.as_secs() / 60;
                    let stderr = format!("{stderr}\ntimeout after {minutes}m");
                    let _ = store.set_job_logs(job_id, Some(stdout), Some(stderr), Some(-1));
                    let _ = store.set_job_status(job_id, JobStatus::Failed, None);
                }
                JobOutcome::Cancelled { stdout, stderr } => {
                    let _ = store.set_job_logs(job_id, Some(stdout), Some(stderr), None);
                    let _ = store.set_job_status(job_id, JobStatus::Cancelled, None);
                }
            }
        }
        self.inflight.lock().remove(&job_id);
    }

    async fn monitor_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.monitor_interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.monitor_pass_queue_pending();
                    self.monitor_pass_reclaim_stale().await;
                }
            }
        }
    }

    /// Pass 1: queue up to [`MONITOR_QUEUE_BATCH`] pending immediate jobs
    /// not already in flight. Tolerates a full queue by stopping early and
    /// retrying the rest next tick.
    fn monitor_pass_queue_pending(&self) {
        let candidates: Vec<JobId> = {
            let store = self.store.lock();
            store
                .list_jobs(&JobFilters { status: Some(JobStatus::Pending), ..Default::default() })
                .into_iter()
                .filter(|job| job.schedule_type == Some(ScheduleType::Immediate))
                .filter(|job| !self.inflight.lock().contains(&job.id))
                .take(MONITOR_QUEUE_BATCH)
                .map(|job| job.id)
                .collect()
        };
        for id in candidates {
            if self.queue(id) == Err(QueueError::Full) {
                break;
            }
        }
    }

    /// Pass 2: reclaim `running` jobs stuck past [`Self::job_timeout`].
    /// A tracked job (one this process started) is cancelled cooperatively;
    /// an untracked one (e.g. left behind by a prior process) is killed
    /// directly by pid, or marked failed outright if the pid is already
    /// gone.
    async fn monitor_pass_reclaim_stale(&self) {
        let timeout = ChronoDuration::seconds(self.job_timeout.as_secs() as i64);
        let now = self.store.lock().clock().now_utc();
        let running: Vec<_> = {
            let store = self.store.lock();
            store.list_jobs(&JobFilters { status: Some(JobStatus::Running), ..Default::default() })
        };

        for job in running {
            let tracked = self.cancels.lock().get(&job.id).cloned();
            let is_stale = job.started_at.is_some_and(|started| now - started > timeout);
            match (tracked, job.pid) {
                (Some(handle), _) if is_stale => {
                    handle.timed_out.store(true, Ordering::Release);
                    handle.token.cancel();
                }
                (Some(_), _) => {}
                (None, Some(pid)) if is_pid_running(pid) => {
                    if !is_stale {
                        continue;
                    }
                    graduated_kill(pid).await;
                    let minutes = self.job_timeout.as_secs() / 60;
                    let mut store = self.store.lock();
                    let _ = store.set_job_logs(job.id, None, Some(format!("timeout after {minutes}m")), Some(-1));
                    let _ = store.set_job_status(job.id, JobStatus::Failed, None);
                    self.inflight.lock().remove(&job.id);
                }
                (None, _) => {
                    // Untracked and either no pid was ever recorded or the
                    // recorded one is already gone: reclaim regardless of
                    // how long the job has been running.
                    let mut store = self.store.lock();
                    let _ = store.set_job_logs(job.id, None, Some("Process not found".to_string()), None);
                    let _ = store.set_job_status(job.id, JobStatus::Failed, None);
                    self.inflight.lock().remove(&job.id);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

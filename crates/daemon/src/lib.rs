// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trackerd: wires the store, ingestor, job service, executor, and
//! scheduler behind one shared handle and runs them as a long-lived
//! process. The command-safety policy and pricing function are injected by
//! the caller (§6); this crate only supplies process wiring.

pub mod config;
pub mod init;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use trk_core::{Clock, CommandPolicy, CoreResult, PricingFn};
use trk_engine::{Executor, ExecutorConfig, Scheduler, SchedulerConfig};
use trk_ingest::{run_watch_loop, spawn_fs_watcher, Ingestor};
use trk_jobs::JobService;
use trk_storage::Store;

pub use config::{Config, ConfigError};
pub use init::{InitStatus, InitializationSnapshot, InitializationState};

/// Poll interval the ingest watch loop falls back to when filesystem
/// notifications are unavailable or miss a write.
const INGEST_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// The running process: one store shared by every component (§5: "the
/// store handle is shared").
pub struct Daemon<C: Clock + 'static> {
    pub config: Config,
    pub init: Arc<InitializationState>,
    pub store: Arc<Mutex<Store<C>>>,
    pub jobs: JobService<C>,
    pub executor: Arc<Executor<C>>,
    pub scheduler: Arc<Scheduler<C>>,
    ingest_shutdown: Option<oneshot::Sender<()>>,
    ingest_handle: Option<JoinHandle<()>>,
}

impl<C: Clock + 'static> Daemon<C> {
    /// Open the store, run one ingest pass, and start the ingest watch
    /// loop, executor, and scheduler as background tasks. Returns once
    /// everything is up; the initialization record reflects `completed` on
    /// success and `failed` (with the error retained) otherwise.
    pub async fn start(config: Config, clock: C, policy: Arc<dyn CommandPolicy>, pricing: PricingFn) -> CoreResult<Self> {
        let init = Arc::new(InitializationState::start(clock.now_utc(), "opening store"));
        let clock_for_init = clock.clone();

        let opened = Self::start_inner(&config, clock, Arc::clone(&policy), pricing, &init).await;
        match &opened {
            Ok(_) => init.complete(clock_for_init.now_utc(), "ready"),
            Err(err) => init.fail(clock_for_init.now_utc(), err.to_string()),
        }
        opened
    }

    async fn start_inner(
        config: &Config,
        clock: C,
        policy: Arc<dyn CommandPolicy>,
        pricing: PricingFn,
        init: &Arc<InitializationState>,
    ) -> CoreResult<Self> {
        std::fs::create_dir_all(&config.state_dir)?;

        let store = Store::open(&config.wal_path, &config.snapshot_path, clock, pricing)?;
        let store = Arc::new(Mutex::new(store));

        init.update_progress(0.4, "running initial ingest sync");
        let mut ingestor = Ingestor::new(Arc::clone(&store), config.log_root.clone());
        if let Err(err) = ingestor.sync_all() {
            tracing::warn!(error = %err, "initial ingest sync failed, continuing with watch loop");
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let file_rx = spawn_fs_watcher(&config.log_root).ok().map(|(watcher, rx)| {
            // Leak the watcher onto a background task so it stays alive for
            // the process lifetime rather than dropping (and stopping) here.
            tokio::spawn(async move {
                let _watcher = watcher;
                std::future::pending::<()>().await;
            });
            rx
        });
        let ingest_handle = tokio::spawn(run_watch_loop(ingestor, file_rx, INGEST_POLL_INTERVAL, shutdown_rx));

        init.update_progress(0.7, "starting executor and scheduler");
        let jobs = JobService::new(Arc::clone(&store));
        let executor = Executor::new(
            Arc::clone(&store),
            policy,
            ExecutorConfig {
                worker_count: config.worker_count,
                queue_capacity: config.queue_capacity,
                job_timeout: config.job_timeout,
                monitor_interval: Duration::from_secs(10),
            },
        );
        executor.start();

        let scheduler = Scheduler::new(
            Arc::clone(&store),
            Arc::clone(&executor),
            SchedulerConfig { tick_interval: config.scheduler_tick, ..SchedulerConfig::default() },
        );
        scheduler.start();

        Ok(Self {
            config: config.clone(),
            init: Arc::clone(init),
            store,
            jobs,
            executor,
            scheduler,
            ingest_shutdown: Some(shutdown_tx),
            ingest_handle: Some(ingest_handle),
        })
    }

    /// Stop every background task and flush a final snapshot.
    pub async fn shutdown(&mut self) -> CoreResult<()> {
        if let Some(tx) = self.ingest_shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.ingest_handle.take() {
            let _ = handle.await;
        }
        self.scheduler.stop().await;
        self.executor.stop().await;
        self.store.lock().save_snapshot()?;
        Ok(())
    }
}

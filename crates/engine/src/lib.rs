// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trk-engine: the job executor (§4.G) and scheduler (§4.H). Both hold the
//! store behind the same `Arc<Mutex<Store<C>>>` handle the rest of the
//! process shares, and the scheduler drives jobs through the executor's
//! queue rather than the store directly.

pub mod command;
pub mod executor;
pub mod process;
pub mod scheduler;

pub use executor::{Executor, ExecutorConfig, QueueError};
pub use scheduler::{Scheduler, SchedulerConfig};

//! # Board Scheduler
//!
//! A fleet resource scheduler for physical test boards shared across a lab.
//!
//! Engineers and automated runners ask a pool for a board by name, by
//! attribute predicate, or "any available", run a job on it, and release it.
//! The scheduler tracks device identity and live health, serves competing
//! demand in priority order, supports blocking and fire-and-forget
//! acquisition, and evicts boards that stay unhealthy.
//!
//! ## Pieces
//!
//! - **Device registry**: known boards, their static descriptors, and live
//!   health. Ids are assigned monotonically; board ids are unique.
//! - **Predicate matcher**: `key=value&&key=value` queries with the
//!   `ignore_offline` and `lock_task` pseudo-keys. A `lock_task` match takes a
//!   soft lease that excludes the board from every later match until unlocked.
//! - **Pool**: slots plus a priority-ordered pending queue (smaller value
//!   first, FIFO on ties) and a ready queue of granted asynchronous requests.
//! - **Pool manager**: acquire, release, cancel, register, unregister,
//!   lock/unlock, and query across any number of named pools.
//! - **Health monitor**: a cancellable background loop that probes boards,
//!   evicts dead ones, and dispatches ready work.
//!
//! ## Example
//!
//! ```rust,ignore
//! use board_scheduler::builders::ManagerBuilder;
//! use board_scheduler::config::PoolConfig;
//! use board_scheduler::core::{AcquireRequest, Descriptor, JobSpec, Selection};
//! use std::time::Duration;
//!
//! let manager = ManagerBuilder::new(my_gateway)
//!     .pool("cloudtest", PoolConfig::default())
//!     .snapshot_dir("/var/lib/board-scheduler")
//!     .build()?;
//!
//! manager.register("cloudtest", Descriptor::new("B1", "evb", "lab-host-3", "10.0.0.7"))?;
//! let monitor = manager.start_health_monitor();
//!
//! let outcome = manager
//!     .acquire(
//!         "cloudtest",
//!         AcquireRequest::new("nightly", Selection::predicate("board_type=evb&&lock_task")?)
//!             .blocking(Some(Duration::from_secs(600)))
//!             .with_job(JobSpec::new(["boot", "suspend_resume"])),
//!     )
//!     .await?;
//!
//! manager.release("cloudtest", outcome.board_id().unwrap())?;
//! monitor.stop().await;
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Device model, matcher, pool bookkeeping, and collaborator seams.
pub mod core;
/// Configuration models for pools, health timing, and persistence.
pub mod config;
/// Builders to construct a pool manager from configuration.
pub mod builders;
/// Infrastructure adapters: snapshot file, notifiers, and ledgers.
pub mod infra;
/// Pool manager operations and the health monitor.
pub mod scheduler;
/// Shared utilities.
pub mod util;

pub use crate::core::SchedulerError;
pub use crate::scheduler::{HealthMonitor, PoolManager};

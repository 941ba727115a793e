//! Health monitor: probes devices, evicts dead ones, and drains ready queues.
//!
//! [`HealthMonitor::spawn`] runs [`PoolManager::run_health_cycle`] on a
//! fixed interval until stopped. Tests drive cycles directly with a
//! simulated cycle duration.

use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::device::OFFLINE_STATUS;
use crate::core::{ExecutionGateway, GatewayError, NotifyKind};
use crate::scheduler::PoolManager;

/// Status stored when the status query times out.
pub const QUERY_TIMEOUT_STATUS: &str = "query timeout";
/// Status stored when the status query fails.
pub const QUERY_FAIL_STATUS: &str = "query fail";

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Devices probed.
    pub probed: usize,
    /// Devices whose status text changed.
    pub status_changes: usize,
    /// Board ids removed for sustained failure.
    pub evicted: Vec<String>,
    /// Ready entries handed to the gateway successfully (dry runs included).
    pub dispatched: usize,
    /// Ready entries whose dispatch failed and were released.
    pub dispatch_failures: usize,
}

impl<G: ExecutionGateway> PoolManager<G> {
    /// Run one monitor cycle; `cycle_secs` is added to failing devices' streaks.
    pub async fn run_health_cycle(&self, cycle_secs: u64) -> CycleReport {
        let cfg = self.health_config();
        let mut report = CycleReport::default();

        for device in self.registry().snapshot() {
            let endpoint = device.endpoint();
            let board_id = device.board_id().to_string();
            let gateway = &self.shared.gateway;
            let (reachable, status) = if gateway.probe(&endpoint).await {
                let query = gateway.query_status(&endpoint, &board_id, cfg.status_timeout());
                let status = match tokio::time::timeout(cfg.status_timeout(), query).await {
                    Ok(Ok(text)) => text.replace(['\r', '\n'], " "),
                    Ok(Err(GatewayError::Timeout)) | Err(_) => QUERY_TIMEOUT_STATUS.to_string(),
                    Ok(Err(GatewayError::Failed(reason))) => {
                        debug!(board_id = %board_id, %reason, "status query failed");
                        QUERY_FAIL_STATUS.to_string()
                    }
                };
                (true, status)
            } else {
                (false, OFFLINE_STATUS.to_string())
            };
            report.probed += 1;

            if device.record_probe(reachable, status) {
                report.status_changes += 1;
                debug!(board_id = %board_id, reachable, "device status changed");
                self.broadcast(NotifyKind::DeviceChanged, &board_id);
            }

            let streak = device.accumulate_streak(cycle_secs);
            if streak > cfg.eviction_threshold_secs {
                match self.evict(&board_id) {
                    Ok(true) => report.evicted.push(board_id),
                    Ok(false) => {}
                    Err(e) => error!(board_id = %board_id, error = %e, "eviction failed"),
                }
            }
        }

        for pool in self.pool_names() {
            let Ok(handle) = self.handle(&pool) else {
                continue;
            };
            let entries = handle.pool.lock().take_ready();
            for entry in entries {
                let request = entry.request;
                let device = entry.device;
                let board_id = device.board_id().to_string();
                self.shared.notifier.notify(
                    NotifyKind::JobAssigned,
                    &format!("{};{board_id}", request.task_name),
                    &request.origin,
                );
                let Some(job) = request.job.as_ref() else {
                    report.dispatched += 1;
                    continue;
                };
                match self
                    .dispatch(&pool, &device, &request.task_name, &request.origin, job)
                    .await
                {
                    Ok(_) => report.dispatched += 1,
                    Err(e) => {
                        report.dispatch_failures += 1;
                        warn!(pool = %pool, task = %request.task_name, board_id = %board_id, error = %e, "deferred dispatch failed; releasing");
                        if let Err(release_err) = self.release(&pool, &board_id) {
                            debug!(board_id = %board_id, error = %release_err, "stale ready entry");
                        }
                    }
                }
            }
        }
        report
    }

    /// Spawn the monitor loop on the current tokio runtime.
    pub fn start_health_monitor(&self) -> HealthMonitor {
        HealthMonitor::spawn(self.clone())
    }
}

/// Handle to a running monitor loop.
pub struct HealthMonitor {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl HealthMonitor {
    /// Reset every device's runtime flags and start cycling.
    pub fn spawn<G: ExecutionGateway>(manager: PoolManager<G>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_health_loop(manager, shutdown_rx));
        info!("health monitor started");
        Self {
            handle,
            shutdown_tx,
        }
    }

    /// True until the loop exits.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal shutdown and wait for the current cycle to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            error!(error = %e, "health monitor task failed");
        }
        info!("health monitor stopped");
    }
}

async fn run_health_loop<G: ExecutionGateway>(
    manager: PoolManager<G>,
    mut shutdown: watch::Receiver<bool>,
) {
    manager.reset_device_state();
    let interval = manager.health_config().interval();
    let mut last_start: Option<Instant> = None;

    loop {
        let started = Instant::now();
        let cycle_secs = last_start.map_or(0, |prev| started.duration_since(prev).as_secs());
        last_start = Some(started);

        let report = manager.run_health_cycle(cycle_secs).await;
        debug!(
            probed = report.probed,
            changed = report.status_changes,
            evicted = report.evicted.len(),
            dispatched = report.dispatched,
            failed = report.dispatch_failures,
            "health cycle complete"
        );

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => {
                debug!("health loop shutting down");
                break;
            }
        }
    }
}

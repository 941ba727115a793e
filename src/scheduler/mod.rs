//! Pool manager: acquire, release, cancel, and administrative operations.
//!
//! Lock order is registry, then the pool map, then a single pool. Device
//! cells are leaf locks. No lock is held across a gateway call.

pub mod health_monitor;

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::config::{validate_pool_name, HealthConfig, PoolConfig};
use crate::core::device::{Descriptor, Device, DeviceSnapshot};
use crate::core::request::{Grant, PendingRequest};
use crate::core::resource_pool::PoolState;
use crate::core::{
    AcquireOutcome, AcquireRequest, BoardPattern, CancelFilter, Cancelled, DeviceRegistry,
    ExecutionGateway, GatewayError, GuiNotifier, JobEvent, JobLedger, JobRecord, JobSpec,
    JobStatus, NotifyKind, PoolView, Registration, Released, ResourcePool, SchedulerError,
    WaitMode,
};
use crate::infra::snapshot::{snapshot_path, PoolSnapshot, SnapshotRecord};
use crate::util::clock::now_ms;

pub use health_monitor::{CycleReport, HealthMonitor};

/// A pool plus its per-pool settings.
#[derive(Debug, Clone)]
struct PoolHandle {
    pool: Arc<ResourcePool>,
    default_wait: Option<Duration>,
}

struct Shared<G> {
    registry: DeviceRegistry,
    pools: RwLock<HashMap<String, PoolHandle>>,
    gateway: Arc<G>,
    notifier: Arc<dyn GuiNotifier>,
    ledger: Mutex<Box<dyn JobLedger>>,
    gui_listeners: RwLock<BTreeSet<String>>,
    snapshot_dir: Option<PathBuf>,
    health: HealthConfig,
}

/// Owns the device registry and every pool. Cheap to clone.
pub struct PoolManager<G: ExecutionGateway> {
    shared: Arc<Shared<G>>,
}

impl<G: ExecutionGateway> Clone for PoolManager<G> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

enum Step {
    Granted(Arc<Device>),
    Queued(Uuid),
    Waiting(Uuid, oneshot::Receiver<Grant>),
}

impl<G: ExecutionGateway> PoolManager<G> {
    pub(crate) fn from_parts(
        gateway: G,
        notifier: Arc<dyn GuiNotifier>,
        ledger: Box<dyn JobLedger>,
        health: HealthConfig,
        snapshot_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: DeviceRegistry::new(),
                pools: RwLock::new(HashMap::new()),
                gateway: Arc::new(gateway),
                notifier,
                ledger: Mutex::new(ledger),
                gui_listeners: RwLock::new(BTreeSet::new()),
                snapshot_dir,
                health,
            }),
        }
    }

    pub(crate) fn add_pool(&self, pool: ResourcePool, default_wait: Option<Duration>) {
        let name = pool.name().to_string();
        self.shared.pools.write().insert(
            name,
            PoolHandle {
                pool: Arc::new(pool),
                default_wait,
            },
        );
    }

    /// Re-create devices from a snapshot; slots come back unowned.
    pub(crate) fn restore(&self, snapshot: PoolSnapshot) -> Result<usize, SchedulerError> {
        let handle = self.handle(&snapshot.name)?;
        let mut registry = self.shared.registry.write();
        let mut state = handle.pool.lock();
        for record in &snapshot.records {
            let device = registry.restore(&snapshot.name, record.id, record.descriptor.clone())?;
            state.attach(device)?;
        }
        tracing::info!(pool = %snapshot.name, devices = snapshot.records.len(), "restored pool snapshot");
        Ok(snapshot.records.len())
    }

    fn handle(&self, pool: &str) -> Result<PoolHandle, SchedulerError> {
        self.shared
            .pools
            .read()
            .get(pool)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(format!("pool {pool}")))
    }

    /// The pool named `pool`.
    pub fn pool(&self, pool: &str) -> Result<Arc<ResourcePool>, SchedulerError> {
        self.handle(pool).map(|h| h.pool)
    }

    /// Names of all pools, sorted.
    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shared.pools.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Add an empty pool at runtime and write its snapshot file.
    pub fn create_pool(&self, name: &str, config: &PoolConfig) -> Result<(), SchedulerError> {
        validate_pool_name(name).map_err(SchedulerError::InvalidRequest)?;
        config.validate().map_err(SchedulerError::InvalidRequest)?;
        let pool = ResourcePool::new(name, config.description.clone(), config.limits());
        {
            let mut pools = self.shared.pools.write();
            if pools.contains_key(name) {
                return Err(SchedulerError::AlreadyExists(format!("pool {name}")));
            }
            self.persist(self.snapshot_of(&pool, &pool.lock()))?;
            pools.insert(
                name.to_string(),
                PoolHandle {
                    pool: Arc::new(pool),
                    default_wait: config.default_wait(),
                },
            );
        }
        tracing::info!(pool = %name, "pool created");
        Ok(())
    }

    /// Remove a pool, its devices, and its snapshot file.
    ///
    /// Refused while requests are pending or slots are owned unless `force`;
    /// forced deletion wakes blocked callers with `NotFound`. Returns the
    /// board ids that were unregistered.
    pub fn delete_pool(&self, name: &str, force: bool) -> Result<Vec<String>, SchedulerError> {
        let (removed, dropped) = {
            let mut registry = self.shared.registry.write();
            let mut pools = self.shared.pools.write();
            let handle = pools
                .get(name)
                .cloned()
                .ok_or_else(|| SchedulerError::NotFound(format!("pool {name}")))?;
            let mut state = handle.pool.lock();
            if !force && (state.pending_len() > 0 || state.used_count() > 0) {
                return Err(SchedulerError::PoolBusy(format!(
                    "pool {name} has {} pending requests and {} owned slots",
                    state.pending_len(),
                    state.used_count()
                )));
            }
            let board_ids = state.board_ids();
            for board_id in &board_ids {
                state.detach(board_id);
                registry.remove(board_id);
            }
            let dropped = state.drain_pending().len();
            pools.remove(name);
            (board_ids, dropped)
        };

        if let Some(dir) = &self.shared.snapshot_dir {
            let path = snapshot_path(dir, name);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "failed to remove pool snapshot");
                    return Err(e.into());
                }
            }
        }
        tracing::info!(pool = %name, boards = ?removed, dropped_requests = dropped, "pool deleted");
        for board_id in &removed {
            self.broadcast(NotifyKind::DeviceChanged, board_id);
        }
        Ok(removed)
    }

    /// The device registry.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.shared.registry
    }

    /// Health monitor timing.
    pub fn health_config(&self) -> HealthConfig {
        self.shared.health
    }

    /// Acquire a device from `pool`.
    ///
    /// Grants immediately when a slot is eligible, dispatching the job if one
    /// is attached; a failed dispatch releases the slot before returning
    /// [`SchedulerError::DispatchFailed`]. Otherwise the request is queued and,
    /// depending on [`WaitMode`], the call waits, returns `Queued`, or fails.
    pub async fn acquire(
        &self,
        pool: &str,
        request: AcquireRequest,
    ) -> Result<AcquireOutcome, SchedulerError> {
        if request.task_name.is_empty() {
            return Err(SchedulerError::InvalidRequest("task name is empty".into()));
        }
        let handle = self.handle(pool)?;
        let AcquireRequest {
            task_name,
            selection,
            priority,
            wait,
            job,
            origin,
        } = request;

        let mut job = job;
        let step = {
            let mut state = handle.pool.lock();
            if let Some(device) = state.claim(&task_name, &selection) {
                Step::Granted(device)
            } else {
                let id = Uuid::new_v4();
                let mut pending = PendingRequest {
                    id,
                    task_name: task_name.clone(),
                    selection: selection.clone(),
                    priority,
                    submitted_at_ms: now_ms(),
                    origin: origin.clone(),
                    job: None,
                    waiter: None,
                };
                match wait {
                    WaitMode::Immediate => return Err(state.miss_error(&selection)),
                    WaitMode::Async => {
                        pending.job = job.take();
                        state.enqueue(pending)?;
                        Step::Queued(id)
                    }
                    WaitMode::Blocking { .. } => {
                        let (tx, rx) = oneshot::channel();
                        pending.waiter = Some(tx);
                        state.enqueue(pending)?;
                        Step::Waiting(id, rx)
                    }
                }
            }
        };

        let device = match step {
            Step::Granted(device) => {
                tracing::info!(pool = %pool, task = %task_name, board_id = %device.board_id(), "granted immediately");
                device
            }
            Step::Queued(request_id) => {
                tracing::info!(pool = %pool, task = %task_name, %request_id, %priority, "queued asynchronous request");
                return Ok(AcquireOutcome::Queued { request_id });
            }
            Step::Waiting(request_id, rx) => {
                tracing::info!(pool = %pool, task = %task_name, %request_id, %priority, "waiting for a device");
                let timeout = match wait {
                    WaitMode::Blocking { timeout } => timeout.or(handle.default_wait),
                    _ => None,
                };
                let grant = wait_for_grant(&handle.pool, request_id, rx, timeout).await?;
                tracing::info!(pool = %pool, task = %task_name, board_id = %grant.device.board_id(), "granted after wait");
                grant.device
            }
        };
        let slot = SlotGuard::new(&handle.pool, device.board_id());
        let outcome = self
            .start_job(pool, device, &task_name, &origin, job.as_ref())
            .await;
        slot.disarm();
        outcome
    }

    async fn start_job(
        &self,
        pool: &str,
        device: Arc<Device>,
        task_name: &str,
        origin: &str,
        job: Option<&JobSpec>,
    ) -> Result<AcquireOutcome, SchedulerError> {
        let board_id = device.board_id().to_string();
        let Some(job) = job else {
            return Ok(AcquireOutcome::Granted {
                board_id,
                dispatch: None,
            });
        };
        match self.dispatch(pool, &device, task_name, origin, job).await {
            Ok(text) => Ok(AcquireOutcome::Granted {
                board_id,
                dispatch: Some(text),
            }),
            Err(e) => {
                tracing::warn!(pool = %pool, task = %task_name, board_id = %board_id, error = %e, "dispatch failed; releasing");
                if let Err(release_err) = self.release(pool, &board_id) {
                    tracing::warn!(board_id = %board_id, error = %release_err, "release after failed dispatch");
                }
                Err(SchedulerError::DispatchFailed(e.to_string()))
            }
        }
    }

    /// Run `job` on `device` and record it in the ledger.
    async fn dispatch(
        &self,
        pool: &str,
        device: &Device,
        task_name: &str,
        origin: &str,
        job: &JobSpec,
    ) -> Result<String, GatewayError> {
        let endpoint = device.endpoint();
        let text = self
            .shared
            .gateway
            .dispatch(&endpoint, device.board_id(), task_name, job)
            .await?;
        device.set_busy(true);
        let started = now_ms();
        let record = JobRecord {
            key: format!("{}-{started}", device.board_id()),
            pool: pool.to_string(),
            task_name: task_name.to_string(),
            board_id: device.board_id().to_string(),
            origin: origin.to_string(),
            history: vec![JobEvent {
                status: JobStatus::Started,
                at_ms: started,
            }],
        };
        tracing::info!(job = %record.key, task = %task_name, board_id = %device.board_id(), "job dispatched");
        self.shared.ledger.lock().start(record);
        Ok(text)
    }

    /// Release `board_id` and hand its slot to the next eligible pending request.
    pub fn release(&self, pool: &str, board_id: &str) -> Result<Released, SchedulerError> {
        let handle = self.handle(pool)?;
        let released = handle.pool.lock().release(board_id)?;
        match &released.reassigned_to {
            Some(task) => tracing::info!(pool = %pool, board_id = %board_id, from = %released.previous_owner, to = %task, "released and reassigned"),
            None => tracing::info!(pool = %pool, board_id = %board_id, from = %released.previous_owner, "released"),
        }
        Ok(released)
    }

    /// Remove the first pending request matching `filter`.
    ///
    /// A blocked caller of the cancelled request wakes with `NotFound`.
    pub fn cancel(&self, pool: &str, filter: &CancelFilter) -> Result<Cancelled, SchedulerError> {
        let handle = self.handle(pool)?;
        let removed = handle.pool.lock().cancel(filter).ok_or_else(|| {
            SchedulerError::NotFound(format!("pending request for `{}`", filter.predicate))
        })?;
        tracing::info!(pool = %pool, task = %removed.task_name, request_id = %removed.id, "cancelled pending request");
        Ok(Cancelled {
            request_id: removed.id,
            task_name: removed.task_name,
        })
    }

    /// Ask the gateway to stop the job running on `board_id`.
    pub async fn cancel_active(&self, pool: &str, board_id: &str) -> Result<(), SchedulerError> {
        let handle = self.handle(pool)?;
        let device = self
            .shared
            .registry
            .get(board_id)
            .filter(|_| handle.pool.lock().contains(board_id))
            .ok_or_else(|| SchedulerError::NotFound(format!("board {board_id} in pool {pool}")))?;
        self.shared
            .gateway
            .cancel_active(&device.endpoint(), board_id)
            .await
            .map_err(|e| SchedulerError::DispatchFailed(e.to_string()))?;
        tracing::info!(pool = %pool, board_id = %board_id, "active job cancelled");
        Ok(())
    }

    /// Insert a device into `pool`, or update it if the board id is known.
    ///
    /// A new device is offered to the pending queue straight away.
    pub fn register(
        &self,
        pool: &str,
        descriptor: Descriptor,
    ) -> Result<Registration, SchedulerError> {
        let handle = self.handle(pool)?;
        let (registration, reassigned, snapshot) = {
            let mut registry = self.shared.registry.write();
            let registration = registry.upsert(pool, descriptor)?;
            let mut state = handle.pool.lock();
            let reassigned = match &registration {
                Registration::Inserted(device) => match state.attach(device.clone()) {
                    Ok(r) => r,
                    Err(e) => {
                        registry.remove(device.board_id());
                        return Err(e);
                    }
                },
                Registration::Updated(_) => None,
            };
            (registration, reassigned, self.snapshot_of(&handle.pool, &state))
        };
        let device = registration.device();
        match &registration {
            Registration::Inserted(_) => tracing::info!(pool = %pool, board_id = %device.board_id(), id = device.id(), "device registered"),
            Registration::Updated(_) => tracing::info!(pool = %pool, board_id = %device.board_id(), id = device.id(), "device updated"),
        }
        if let Some(task) = reassigned {
            tracing::info!(pool = %pool, board_id = %device.board_id(), task = %task, "new device granted to pending request");
        }
        self.persist(snapshot)?;
        self.broadcast(NotifyKind::DeviceChanged, device.board_id());
        Ok(registration)
    }

    /// Remove every device of `pool` matching `pattern`.
    pub fn unregister(
        &self,
        pool: &str,
        pattern: &BoardPattern,
    ) -> Result<Vec<String>, SchedulerError> {
        let handle = self.handle(pool)?;
        let compiled = pattern.compile()?;
        let (removed, snapshot) = {
            let mut registry = self.shared.registry.write();
            let targets: Vec<String> = registry
                .matching(&compiled)
                .into_iter()
                .filter(|e| e.pool == pool)
                .map(|e| e.device.board_id().to_string())
                .collect();
            let mut state = handle.pool.lock();
            for board_id in &targets {
                state.detach(board_id);
                registry.remove(board_id);
            }
            (targets, self.snapshot_of(&handle.pool, &state))
        };
        if removed.is_empty() {
            return Err(SchedulerError::NotFound(format!("no board matches {pattern:?}")));
        }
        tracing::info!(pool = %pool, boards = ?removed, "devices unregistered");
        self.persist(snapshot)?;
        for board_id in &removed {
            self.broadcast(NotifyKind::DeviceChanged, board_id);
        }
        Ok(removed)
    }

    /// Set the lease on every device matching `pattern`.
    pub fn lock(&self, pattern: &BoardPattern) -> Result<Vec<String>, SchedulerError> {
        self.set_lease(pattern, true)
    }

    /// Clear the lease on every device matching `pattern`.
    pub fn unlock(&self, pattern: &BoardPattern) -> Result<Vec<String>, SchedulerError> {
        self.set_lease(pattern, false)
    }

    fn set_lease(&self, pattern: &BoardPattern, leased: bool) -> Result<Vec<String>, SchedulerError> {
        let compiled = pattern.compile()?;
        let affected: Vec<String> = {
            let registry = self.shared.registry.read();
            registry
                .matching(&compiled)
                .into_iter()
                .map(|e| {
                    e.device.set_leased(leased);
                    e.device.board_id().to_string()
                })
                .collect()
        };
        if affected.is_empty() {
            return Err(SchedulerError::NotFound(format!("no board matches {pattern:?}")));
        }
        tracing::info!(boards = ?affected, leased, "lease flag set");
        Ok(affected)
    }

    /// Snapshot of `pool`'s queues, and slots when `include_slots`.
    pub fn query(&self, pool: &str, include_slots: bool) -> Result<PoolView, SchedulerError> {
        Ok(self.handle(pool)?.pool.query(include_slots))
    }

    /// Registered devices, optionally only `board_id`.
    pub fn list_devices(&self, board_id: Option<&str>) -> Vec<DeviceSnapshot> {
        self.shared
            .registry
            .snapshot()
            .iter()
            .filter(|d| board_id.is_none_or(|b| d.board_id() == b))
            .map(|d| d.snapshot())
            .collect()
    }

    /// Add a GUI endpoint to the broadcast set.
    pub fn register_gui(&self, endpoint: impl Into<String>) -> bool {
        self.shared.gui_listeners.write().insert(endpoint.into())
    }

    /// Remove a GUI endpoint from the broadcast set.
    pub fn unregister_gui(&self, endpoint: &str) -> bool {
        self.shared.gui_listeners.write().remove(endpoint)
    }

    /// Current GUI endpoints.
    pub fn gui_listeners(&self) -> Vec<String> {
        self.shared.gui_listeners.read().iter().cloned().collect()
    }

    fn broadcast(&self, kind: NotifyKind, payload: &str) {
        let listeners = self.gui_listeners();
        for target in &listeners {
            self.shared.notifier.notify(kind, payload, target);
        }
    }

    /// Ledger record for `key`.
    pub fn job(&self, key: &str) -> Option<JobRecord> {
        self.shared.ledger.lock().get(key)
    }

    /// All ledger records in start order.
    pub fn jobs(&self) -> Vec<JobRecord> {
        self.shared.ledger.lock().records()
    }

    /// Append a status to job `key` and notify its requester.
    pub fn update_job(&self, key: &str, status: JobStatus) -> Result<JobRecord, SchedulerError> {
        let record = self
            .shared
            .ledger
            .lock()
            .append(key, status)
            .ok_or_else(|| SchedulerError::NotFound(format!("job {key}")))?;
        self.shared
            .notifier
            .notify(NotifyKind::JobUpdated, key, &record.origin);
        Ok(record)
    }

    /// Record a terminal status for job `key` and release its board.
    pub fn finish_job(&self, key: &str, status: JobStatus) -> Result<Released, SchedulerError> {
        if !status.is_terminal() {
            return Err(SchedulerError::InvalidRequest(format!(
                "{status:?} does not finish a job"
            )));
        }
        let record = self.update_job(key, status)?;
        tracing::info!(job = %key, board_id = %record.board_id, "job finished");
        self.release(&record.pool, &record.board_id)
    }

    /// Remove a device whose health has failed for too long.
    ///
    /// Devices with an owned slot are kept so in-flight work is not orphaned.
    pub(crate) fn evict(&self, board_id: &str) -> Result<bool, SchedulerError> {
        let (pool, snapshot) = {
            let mut registry = self.shared.registry.write();
            let Some(entry) = registry.get(board_id) else {
                return Ok(false);
            };
            let pool = entry.pool.clone();
            let handle = self.handle(&pool)?;
            let mut state = handle.pool.lock();
            if state.is_owned(board_id) {
                tracing::warn!(pool = %pool, board_id = %board_id, "eviction deferred: slot is owned");
                return Ok(false);
            }
            state.detach(board_id);
            registry.remove(board_id);
            (pool, self.snapshot_of(&handle.pool, &state))
        };
        tracing::warn!(pool = %pool, board_id = %board_id, "device evicted after sustained health failure");
        self.persist(snapshot)?;
        self.broadcast(NotifyKind::DeviceChanged, board_id);
        Ok(true)
    }

    /// Clear streaks, leases, and busy flags on every device.
    pub fn reset_device_state(&self) {
        for device in self.shared.registry.snapshot() {
            device.reset_runtime_state();
        }
    }

    fn snapshot_of(&self, pool: &ResourcePool, state: &PoolState) -> Option<PoolSnapshot> {
        self.shared.snapshot_dir.as_ref()?;
        Some(PoolSnapshot {
            name: pool.name().to_string(),
            description: pool.description().to_string(),
            records: state
                .records()
                .into_iter()
                .map(|(id, descriptor)| SnapshotRecord { id, descriptor })
                .collect(),
        })
    }

    fn persist(&self, snapshot: Option<PoolSnapshot>) -> Result<(), SchedulerError> {
        let (Some(snapshot), Some(dir)) = (snapshot, self.shared.snapshot_dir.as_ref()) else {
            return Ok(());
        };
        let path = snapshot_path(dir, &snapshot.name);
        snapshot.write_to(&path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to write pool snapshot");
        })?;
        tracing::debug!(path = %path.display(), devices = snapshot.records.len(), "pool snapshot written");
        Ok(())
    }
}

/// Wait for a release to grant `request_id`, withdrawing it on timeout.
async fn wait_for_grant(
    pool: &ResourcePool,
    request_id: Uuid,
    rx: oneshot::Receiver<Grant>,
    timeout: Option<Duration>,
) -> Result<Grant, SchedulerError> {
    let cancelled = || SchedulerError::NotFound(format!("request {request_id} was cancelled"));
    let mut wait = PendingWait {
        pool,
        request_id,
        rx: Some(rx),
    };
    let Some(rx) = wait.rx.as_mut() else {
        return Err(cancelled());
    };
    let received = match timeout {
        Some(limit) => tokio::time::timeout(limit, rx).await.ok(),
        None => Some(rx.await),
    };
    match received {
        Some(result) => {
            wait.rx = None;
            result.map_err(|_| cancelled())
        }
        None => {
            let raced = wait.withdraw(&mut pool.lock());
            // A grant that beat the withdrawal is kept.
            raced.ok_or_else(|| {
                tracing::info!(%request_id, "acquire timed out");
                SchedulerError::Timeout
            })
        }
    }
}

/// A queued blocking request. Dropped unresolved, it withdraws the request or
/// hands back a slot that was granted after the caller stopped listening.
struct PendingWait<'a> {
    pool: &'a ResourcePool,
    request_id: Uuid,
    rx: Option<oneshot::Receiver<Grant>>,
}

impl PendingWait<'_> {
    /// Take the request out of the queue; returns the grant if one already landed.
    fn withdraw(&mut self, state: &mut PoolState) -> Option<Grant> {
        let mut rx = self.rx.take()?;
        if state.remove_pending(self.request_id).is_some() {
            return None;
        }
        rx.try_recv().ok()
    }
}

impl Drop for PendingWait<'_> {
    fn drop(&mut self) {
        if self.rx.is_none() {
            return;
        }
        let pool = self.pool;
        let mut state = pool.lock();
        let Some(grant) = self.withdraw(&mut state) else {
            tracing::debug!(request_id = %self.request_id, "abandoned request withdrawn");
            return;
        };
        let board_id = grant.device.board_id().to_string();
        match state.release(&board_id) {
            Ok(released) => tracing::warn!(
                request_id = %self.request_id,
                board_id = %board_id,
                reassigned_to = ?released.reassigned_to,
                "acquire abandoned after grant; slot released"
            ),
            Err(e) => tracing::debug!(board_id = %board_id, error = %e, "abandoned grant already released"),
        }
    }
}

/// Releases a granted slot if the acquire call is dropped before it returns.
struct SlotGuard<'a> {
    pool: &'a ResourcePool,
    board_id: Option<String>,
}

impl<'a> SlotGuard<'a> {
    fn new(pool: &'a ResourcePool, board_id: &str) -> Self {
        Self {
            pool,
            board_id: Some(board_id.to_string()),
        }
    }

    fn disarm(mut self) {
        self.board_id = None;
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let Some(board_id) = self.board_id.take() else {
            return;
        };
        match self.pool.lock().release(&board_id) {
            Ok(_) => tracing::warn!(board_id = %board_id, "acquire dropped before dispatch finished; slot released"),
            Err(e) => tracing::debug!(board_id = %board_id, error = %e, "dropped acquire found slot already free"),
        }
    }
}

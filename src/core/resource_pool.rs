//! Pool of resource slots with pending and ready queues.
//!
//! All mutation happens under one `parking_lot::Mutex` per pool. Gateway
//! calls never run while it is held; callers take what they need from the
//! guarded state and release the lock before dispatching.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::device::{Descriptor, Device};
use crate::core::predicate::LeasePolicy;
use crate::core::request::{
    CancelFilter, Grant, PendingRequest, ReadyEntry, RequestView, Selection,
};
use crate::core::SchedulerError;
use crate::util::clock::now_ms;
use crate::util::serde::{DeviceId, RequestId};

/// Capacity limits for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Maximum number of slots (devices) in the pool.
    pub max_slots: usize,
    /// Maximum number of pending requests.
    pub max_pending: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_slots: 1024,
            max_pending: 4096,
        }
    }
}

/// Binding of one device into the pool.
#[derive(Debug)]
pub(crate) struct ResourceSlot {
    device: Arc<Device>,
    owner: Option<String>,
    requested_at_ms: Option<u128>,
    acquired_at_ms: Option<u128>,
    prior_tasks: BTreeSet<String>,
}

impl ResourceSlot {
    fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            owner: None,
            requested_at_ms: None,
            acquired_at_ms: None,
            prior_tasks: BTreeSet::new(),
        }
    }

    const fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    fn view(&self) -> SlotView {
        SlotView {
            board_id: self.device.board_id().to_string(),
            device_id: self.device.id(),
            owned: self.is_owned(),
            owner_task: self.owner.clone().unwrap_or_else(|| "none".to_string()),
            prior_tasks: self
                .prior_tasks
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
            requested_at_ms: self.requested_at_ms,
            acquired_at_ms: self.acquired_at_ms,
            leased: self.device.is_leased(),
            busy: self.device.is_busy(),
        }
    }
}

/// What a release did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    /// Released board.
    pub board_id: String,
    /// Task that held the slot.
    pub previous_owner: String,
    /// Task the slot was handed to, if a pending request was eligible.
    pub reassigned_to: Option<String>,
}

/// Guarded pool contents.
#[derive(Debug)]
pub(crate) struct PoolState {
    limits: PoolLimits,
    slots: Vec<ResourceSlot>,
    pending: Vec<PendingRequest>,
    ready: VecDeque<ReadyEntry>,
    used: usize,
}

impl PoolState {
    fn new(limits: PoolLimits) -> Self {
        Self {
            limits,
            slots: Vec::new(),
            pending: Vec::new(),
            ready: VecDeque::new(),
            used: 0,
        }
    }

    fn position(&self, board_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.device.board_id() == board_id)
    }

    /// Pick and own a slot for `task_name`, or `None` when nothing is eligible.
    pub(crate) fn claim(&mut self, task_name: &str, selection: &Selection) -> Option<Arc<Device>> {
        let idx = match selection {
            // Ownership and history are checked before the matcher so a
            // `lock_task` lease only lands on the slot actually chosen.
            Selection::Predicate(p) => self.slots.iter().position(|s| {
                !s.is_owned()
                    && !s.prior_tasks.contains(task_name)
                    && p.matches(&s.device, LeasePolicy::Apply).matched
            })?,
            Selection::First if self.used < self.slots.len() => {
                self.slots.iter().position(|s| !s.is_owned())?
            }
            Selection::Any if self.used < self.slots.len() => {
                let free: Vec<usize> = (0..self.slots.len())
                    .filter(|&i| !self.slots[i].is_owned())
                    .collect();
                if free.is_empty() {
                    return None;
                }
                free[rand::rng().random_range(0..free.len())]
            }
            Selection::First | Selection::Any => return None,
        };
        self.own(idx, task_name, now_ms());
        Some(self.slots[idx].device.clone())
    }

    /// Error for a request that may not queue and found nothing.
    pub(crate) fn miss_error(&self, selection: &Selection) -> SchedulerError {
        match selection {
            Selection::Predicate(p) => {
                let leased_hit = self.slots.iter().any(|s| {
                    !s.is_owned() && s.device.is_leased() && p.matches_attributes(&s.device)
                });
                if leased_hit {
                    SchedulerError::AlreadyLeased(p.to_string())
                } else {
                    SchedulerError::NoMatch(p.to_string())
                }
            }
            Selection::Any => SchedulerError::NoMatch("any".into()),
            Selection::First => SchedulerError::NoMatch("first".into()),
        }
    }

    fn own(&mut self, idx: usize, task_name: &str, requested_at_ms: u128) {
        let slot = &mut self.slots[idx];
        debug_assert!(!slot.is_owned());
        slot.owner = Some(task_name.to_string());
        slot.requested_at_ms = Some(requested_at_ms);
        slot.acquired_at_ms = Some(now_ms());
        slot.prior_tasks.insert(task_name.to_string());
        self.used += 1;
    }

    fn disown(&mut self, idx: usize) -> Option<String> {
        let owner = self.slots[idx].owner.take();
        if owner.is_some() {
            self.used -= 1;
        }
        owner
    }

    /// Insert keeping ascending priority, FIFO among equals.
    pub(crate) fn enqueue(&mut self, request: PendingRequest) -> Result<(), SchedulerError> {
        if self.pending.len() >= self.limits.max_pending {
            return Err(SchedulerError::Exceeded(format!(
                "pending queue holds {} requests",
                self.limits.max_pending
            )));
        }
        self.insert_pending(request);
        Ok(())
    }

    fn insert_pending(&mut self, request: PendingRequest) {
        let pos = self
            .pending
            .iter()
            .position(|p| p.priority > request.priority)
            .unwrap_or(self.pending.len());
        self.pending.insert(pos, request);
    }

    pub(crate) fn remove_pending(&mut self, id: RequestId) -> Option<PendingRequest> {
        let pos = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(pos))
    }

    /// Free the slot for `board_id` and offer it to the pending queue.
    pub(crate) fn release(&mut self, board_id: &str) -> Result<Released, SchedulerError> {
        let idx = self
            .position(board_id)
            .ok_or_else(|| SchedulerError::NotFound(format!("board {board_id}")))?;
        self.slots[idx].device.set_busy(false);
        let previous_owner = self
            .disown(idx)
            .ok_or_else(|| SchedulerError::NotOwner(format!("board {board_id} is not owned")))?;
        let reassigned_to = self.offer_slot(idx);
        Ok(Released {
            board_id: board_id.to_string(),
            previous_owner,
            reassigned_to,
        })
    }

    /// Hand a free slot to the first eligible pending request.
    ///
    /// Blocked callers are woken with the grant; asynchronous requests move
    /// to the ready queue. Requests whose caller has gone away are dropped.
    fn offer_slot(&mut self, idx: usize) -> Option<String> {
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].is_abandoned() {
                let stale = self.pending.remove(i);
                tracing::debug!(request_id = %stale.id, task = %stale.task_name, "dropping abandoned request");
                continue;
            }
            let (eligible, lease_granted) = {
                let slot = &self.slots[idx];
                let request = &self.pending[i];
                match &request.selection {
                    Selection::Predicate(_) if slot.prior_tasks.contains(&request.task_name) => {
                        (false, false)
                    }
                    Selection::Predicate(p) => {
                        let outcome = p.matches(&slot.device, LeasePolicy::Apply);
                        (outcome.matched, outcome.lease_granted)
                    }
                    Selection::Any | Selection::First => (true, false),
                }
            };
            if !eligible {
                i += 1;
                continue;
            }

            let mut request = self.pending.remove(i);
            let had_prior = self.slots[idx].prior_tasks.contains(&request.task_name);
            self.own(idx, &request.task_name, request.submitted_at_ms);
            let device = self.slots[idx].device.clone();
            let task_name = request.task_name.clone();
            match request.waiter.take() {
                Some(waiter) => {
                    if waiter.send(Grant { device }).is_err() {
                        // Receiver dropped after the abandonment check.
                        self.revert_grant(idx, &task_name, had_prior, lease_granted);
                        continue;
                    }
                }
                None => self.ready.push_back(ReadyEntry { request, device }),
            }
            return Some(task_name);
        }
        None
    }

    /// Undo a grant nobody received: ownership, history entry, and any lease it took.
    fn revert_grant(&mut self, idx: usize, task_name: &str, had_prior: bool, lease_granted: bool) {
        self.disown(idx);
        let slot = &mut self.slots[idx];
        if !had_prior {
            slot.prior_tasks.remove(task_name);
        }
        if lease_granted {
            slot.device.set_leased(false);
        }
    }

    /// Add a device slot and offer it to the pending queue.
    pub(crate) fn attach(&mut self, device: Arc<Device>) -> Result<Option<String>, SchedulerError> {
        if self.slots.len() >= self.limits.max_slots {
            return Err(SchedulerError::Exceeded(format!(
                "pool holds {} slots",
                self.limits.max_slots
            )));
        }
        self.slots.push(ResourceSlot::new(device));
        let idx = self.slots.len() - 1;
        Ok(self.offer_slot(idx))
    }

    /// Remove a device slot. Ready entries bound to it go back to pending.
    pub(crate) fn detach(&mut self, board_id: &str) -> bool {
        let Some(idx) = self.position(board_id) else {
            return false;
        };
        self.disown(idx);
        self.slots.remove(idx);
        let (stranded, kept): (Vec<_>, Vec<_>) = self
            .ready
            .drain(..)
            .partition(|e| e.device.board_id() == board_id);
        self.ready = kept.into();
        for entry in stranded {
            self.insert_pending(entry.request);
        }
        true
    }

    pub(crate) fn is_owned(&self, board_id: &str) -> bool {
        self.position(board_id)
            .is_some_and(|i| self.slots[i].is_owned())
    }

    pub(crate) fn contains(&self, board_id: &str) -> bool {
        self.position(board_id).is_some()
    }

    #[cfg(test)]
    pub(crate) fn owner_of(&self, board_id: &str) -> Option<&str> {
        self.position(board_id)
            .and_then(|i| self.slots[i].owner.as_deref())
    }

    /// First pending request matching `filter`, removed.
    pub(crate) fn cancel(&mut self, filter: &CancelFilter) -> Option<PendingRequest> {
        let pos = self.pending.iter().position(|p| filter.matches(p))?;
        Some(self.pending.remove(pos))
    }

    /// Remove every pending request. Blocked callers wake with `NotFound`.
    pub(crate) fn drain_pending(&mut self) -> Vec<PendingRequest> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn board_ids(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| s.device.board_id().to_string())
            .collect()
    }

    pub(crate) fn take_ready(&mut self) -> Vec<ReadyEntry> {
        self.ready.drain(..).collect()
    }

    /// Id and descriptor of every device, in slot order.
    pub(crate) fn records(&self) -> Vec<(DeviceId, Descriptor)> {
        self.slots
            .iter()
            .map(|s| (s.device.id(), s.device.descriptor()))
            .collect()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) const fn used_count(&self) -> usize {
        self.used
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Observable view of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    /// Board id.
    pub board_id: String,
    /// Device id.
    pub device_id: DeviceId,
    /// Slot is owned.
    pub owned: bool,
    /// Owning task, or `none`.
    pub owner_task: String,
    /// Tasks that have held this slot, joined by `;`.
    pub prior_tasks: String,
    /// When the current owner asked for a device.
    pub requested_at_ms: Option<u128>,
    /// When the current owner got the slot.
    pub acquired_at_ms: Option<u128>,
    /// Device lease flag.
    pub leased: bool,
    /// Device busy flag.
    pub busy: bool,
}

/// Observable snapshot of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    /// Pool name.
    pub name: String,
    /// Pool description.
    pub description: String,
    /// Number of slots.
    pub slot_count: usize,
    /// Number of owned slots.
    pub used_count: usize,
    /// Pending requests in service order.
    pub pending: Vec<RequestView>,
    /// Ready requests in dispatch order.
    pub ready: Vec<RequestView>,
    /// Slots, omitted for pending-only queries.
    pub slots: Option<Vec<SlotView>>,
}

/// A named pool of device slots.
#[derive(Debug)]
pub struct ResourcePool {
    name: String,
    description: String,
    state: Mutex<PoolState>,
}

impl ResourcePool {
    /// Empty pool.
    pub fn new(name: impl Into<String>, description: impl Into<String>, limits: PoolLimits) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            state: Mutex::new(PoolState::new(limits)),
        }
    }

    /// Pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pool description.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock()
    }

    /// Snapshot of queues and, when `include_slots`, slots.
    pub fn query(&self, include_slots: bool) -> PoolView {
        let state = self.lock();
        PoolView {
            name: self.name.clone(),
            description: self.description.clone(),
            slot_count: state.slot_count(),
            used_count: state.used_count(),
            pending: state.pending.iter().map(PendingRequest::view).collect(),
            ready: state.ready.iter().map(ReadyEntry::view).collect(),
            slots: include_slots.then(|| state.slots.iter().map(ResourceSlot::view).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::Descriptor;
    use crate::util::serde::Priority;
    use tokio::sync::oneshot;
    use uuid::Uuid;

    fn device(id: u64, board_id: &str) -> Arc<Device> {
        Arc::new(Device::new(id, Descriptor::new(board_id, "evb", "host", "10.0.0.1")))
    }

    fn make_request(task: &str, selection: Selection, priority: u32) -> PendingRequest {
        PendingRequest {
            id: Uuid::new_v4(),
            task_name: task.to_string(),
            selection,
            priority: Priority::new(priority).unwrap(),
            submitted_at_ms: now_ms(),
            origin: "10.1.1.1".to_string(),
            job: None,
            waiter: None,
        }
    }

    fn pool_with(boards: &[&str]) -> PoolState {
        let mut state = PoolState::new(PoolLimits::default());
        for (i, b) in boards.iter().enumerate() {
            state.attach(device(i as u64 + 1, b)).unwrap();
        }
        state
    }

    fn owned_count(state: &PoolState) -> usize {
        state.slots.iter().filter(|s| s.is_owned()).count()
    }

    #[test]
    fn test_priority_ordering_is_stable() {
        let mut state = pool_with(&[]);
        state.enqueue(make_request("a", Selection::Any, 50)).unwrap();
        state.enqueue(make_request("b", Selection::Any, 10)).unwrap();
        state.enqueue(make_request("c", Selection::Any, 50)).unwrap();
        state.enqueue(make_request("d", Selection::Any, 10)).unwrap();
        state.enqueue(make_request("e", Selection::Any, 99)).unwrap();

        let order: Vec<&str> = state.pending.iter().map(|p| p.task_name.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn test_pending_limit() {
        let mut state = PoolState::new(PoolLimits {
            max_slots: 1,
            max_pending: 1,
        });
        state.enqueue(make_request("a", Selection::Any, 50)).unwrap();
        assert!(matches!(
            state.enqueue(make_request("b", Selection::Any, 50)),
            Err(SchedulerError::Exceeded(_))
        ));
    }

    #[test]
    fn test_first_claims_in_slot_order_and_counts() {
        let mut state = pool_with(&["B1", "B2"]);
        assert_eq!(state.claim("t1", &Selection::First).unwrap().board_id(), "B1");
        assert_eq!(state.claim("t2", &Selection::First).unwrap().board_id(), "B2");
        assert!(state.claim("t3", &Selection::First).is_none());
        assert_eq!(state.used_count(), 2);
        assert_eq!(owned_count(&state), 2);
    }

    #[test]
    fn test_any_claims_only_free_slots() {
        let mut state = pool_with(&["B1", "B2", "B3"]);
        state.claim("t1", &Selection::First).unwrap();
        for _ in 0..2 {
            let dev = state.claim("t", &Selection::Any).unwrap();
            assert_ne!(dev.board_id(), "B1");
        }
        assert!(state.claim("t", &Selection::Any).is_none());
        assert_eq!(owned_count(&state), state.used_count());
    }

    #[test]
    fn test_predicate_skips_prior_task() {
        let mut state = pool_with(&["B1"]);
        let sel = Selection::predicate("board_id=B1").unwrap();
        state.claim("t1", &sel).unwrap();
        state.release("B1").unwrap();
        // t1 already held B1.
        assert!(state.claim("t1", &sel).is_none());
        assert!(state.claim("t2", &sel).is_some());
    }

    #[test]
    fn test_predicate_miss_does_not_fall_back() {
        let mut state = pool_with(&["B1"]);
        let sel = Selection::predicate("board_id=B9").unwrap();
        assert!(state.claim("t1", &sel).is_none());
        assert_eq!(state.used_count(), 0);
        assert!(matches!(state.miss_error(&sel), SchedulerError::NoMatch(_)));
    }

    #[test]
    fn test_miss_error_reports_lease() {
        let mut state = pool_with(&["B1"]);
        state.slots[0].device.set_leased(true);
        let sel = Selection::predicate("board_id=B1").unwrap();
        assert!(state.claim("t1", &sel).is_none());
        assert!(matches!(state.miss_error(&sel), SchedulerError::AlreadyLeased(_)));
    }

    #[test]
    fn test_release_errors() {
        let mut state = pool_with(&["B1"]);
        assert!(matches!(state.release("B9"), Err(SchedulerError::NotFound(_))));
        state.slots[0].device.set_busy(true);
        assert!(matches!(state.release("B1"), Err(SchedulerError::NotOwner(_))));
        // Busy is cleared even when the release is refused.
        assert!(!state.slots[0].device.is_busy());
    }

    #[test]
    fn test_release_prefers_lower_priority_value() {
        let mut state = pool_with(&["B1"]);
        state.claim("holder", &Selection::First).unwrap();
        state.enqueue(make_request("p10", Selection::Any, 10)).unwrap();
        state.enqueue(make_request("p5", Selection::Any, 5)).unwrap();

        let released = state.release("B1").unwrap();
        assert_eq!(released.previous_owner, "holder");
        assert_eq!(released.reassigned_to.as_deref(), Some("p5"));
        assert_eq!(state.ready.len(), 1);
        assert_eq!(state.pending.len(), 1);
        assert_eq!(state.used_count(), 1);
    }

    #[test]
    fn test_release_wakes_blocked_waiter() {
        let mut state = pool_with(&["B1"]);
        state.claim("holder", &Selection::First).unwrap();
        let (tx, mut rx) = oneshot::channel();
        let mut req = make_request("waiter", Selection::First, 50);
        req.waiter = Some(tx);
        state.enqueue(req).unwrap();

        state.release("B1").unwrap();
        let grant = rx.try_recv().unwrap();
        assert_eq!(grant.device.board_id(), "B1");
        assert!(state.ready.is_empty());
        assert_eq!(state.owner_of("B1"), Some("waiter"));
    }

    #[test]
    fn test_release_skips_abandoned_waiter() {
        let mut state = pool_with(&["B1"]);
        state.claim("holder", &Selection::First).unwrap();
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let mut gone = make_request("gone", Selection::First, 1);
        gone.waiter = Some(tx);
        state.enqueue(gone).unwrap();
        state.enqueue(make_request("next", Selection::First, 50)).unwrap();

        let released = state.release("B1").unwrap();
        assert_eq!(released.reassigned_to.as_deref(), Some("next"));
        assert_eq!(state.pending_len(), 0);
    }

    #[test]
    fn test_reverted_grant_drops_lease_and_history() {
        let mut state = pool_with(&["B1"]);
        let lock = Selection::predicate("board_id=B1&&lock_task").unwrap();
        state.claim("T", &lock).unwrap();
        let device = state.slots[0].device.clone();
        assert!(device.is_leased());

        state.revert_grant(0, "T", false, true);
        assert_eq!(state.used_count(), 0);
        assert!(!device.is_leased());
        assert!(state.slots[0].prior_tasks.is_empty());
        // The same task may take the board again.
        assert!(state.claim("T", &lock).is_some());
    }

    #[test]
    fn test_reverted_grant_keeps_earlier_history() {
        let mut state = pool_with(&["B1"]);
        state.claim("T", &Selection::First).unwrap();
        state.release("B1").unwrap();
        state.claim("T", &Selection::First).unwrap();

        state.revert_grant(0, "T", true, false);
        assert!(state.slots[0].prior_tasks.contains("T"));
        assert!(!state.is_owned("B1"));
    }

    #[test]
    fn test_drain_pending_closes_waiters() {
        let mut state = pool_with(&[]);
        let (tx, mut rx) = oneshot::channel();
        let mut req = make_request("waiter", Selection::Any, 50);
        req.waiter = Some(tx);
        state.enqueue(req).unwrap();

        let drained = state.drain_pending();
        assert_eq!(drained.len(), 1);
        drop(drained);
        assert_eq!(state.pending_len(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_attach_satisfies_pending() {
        let mut state = pool_with(&[]);
        state
            .enqueue(make_request("t1", Selection::predicate("board_id=B2").unwrap(), 50))
            .unwrap();
        assert_eq!(state.attach(device(1, "B1")).unwrap(), None);
        assert_eq!(state.attach(device(2, "B2")).unwrap().as_deref(), Some("t1"));
        assert_eq!(state.used_count(), 1);
    }

    #[test]
    fn test_detach_requeues_ready_entries() {
        let mut state = pool_with(&["B1"]);
        state.claim("holder", &Selection::First).unwrap();
        state.enqueue(make_request("async", Selection::Any, 50)).unwrap();
        state.release("B1").unwrap();
        assert_eq!(state.ready.len(), 1);

        assert!(state.detach("B1"));
        assert_eq!(state.slot_count(), 0);
        assert_eq!(state.used_count(), 0);
        assert!(state.ready.is_empty());
        assert_eq!(state.pending[0].task_name, "async");
    }

    #[test]
    fn test_cancel_narrowing() {
        let mut state = pool_with(&[]);
        let sel = Selection::predicate("board_type=evb").unwrap();
        let mut a = make_request("ta", sel.clone(), 50);
        a.origin = "host-a".into();
        let mut b = make_request("tb", sel, 50);
        b.origin = "host-b".into();
        state.enqueue(a).unwrap();
        state.enqueue(b).unwrap();

        let filter = CancelFilter::entry("board_type=evb").with_origin("host-b");
        assert_eq!(state.cancel(&filter).unwrap().task_name, "tb");
        assert!(state.cancel(&filter).is_none());
        assert!(state.cancel(&CancelFilter::entry("board_type=evb").with_task("nope")).is_none());
        assert_eq!(state.cancel(&CancelFilter::entry("board_type=evb")).unwrap().task_name, "ta");
    }

    #[test]
    fn test_query_view() {
        let pool = ResourcePool::new("cloudtest", "boards", PoolLimits::default());
        pool.lock().attach(device(1, "B1")).unwrap();
        pool.lock().claim("t1", &Selection::First).unwrap();

        let view = pool.query(true);
        assert_eq!(view.slot_count, 1);
        assert_eq!(view.used_count, 1);
        let slots = view.slots.unwrap();
        assert_eq!(slots[0].owner_task, "t1");
        assert_eq!(slots[0].prior_tasks, "t1");
        assert!(pool.query(false).slots.is_none());
    }
}

//! Shared fixtures: a scripted gateway and manager setup.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use board_scheduler::builders::ManagerBuilder;
use board_scheduler::config::{HealthConfig, PoolConfig};
use board_scheduler::core::{Descriptor, ExecutionGateway, GatewayError, JobSpec};
use board_scheduler::infra::{InMemoryJobLedger, InMemoryNotifier};
use board_scheduler::PoolManager;

pub const POOL: &str = "cloudtest";

#[derive(Default)]
struct FakeState {
    unreachable: HashSet<String>,
    statuses: HashMap<String, Result<String, GatewayError>>,
    failing_dispatch: HashSet<String>,
    stalled_dispatch: HashSet<String>,
    dispatched: Vec<(String, String)>,
    cancelled: Vec<String>,
}

/// Gateway whose answers are set by the test. Boards report "Board Online" by default.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub fn set_reachable(&self, endpoint: &str, reachable: bool) {
        let mut state = self.state.lock();
        if reachable {
            state.unreachable.remove(endpoint);
        } else {
            state.unreachable.insert(endpoint.to_string());
        }
    }

    pub fn set_status(&self, board_id: &str, status: Result<String, GatewayError>) {
        self.state.lock().statuses.insert(board_id.to_string(), status);
    }

    pub fn fail_dispatch(&self, board_id: &str) {
        self.state.lock().failing_dispatch.insert(board_id.to_string());
    }

    /// Dispatches to `board_id` never complete.
    pub fn stall_dispatch(&self, board_id: &str) {
        self.state.lock().stalled_dispatch.insert(board_id.to_string());
    }

    pub fn dispatched(&self) -> Vec<(String, String)> {
        self.state.lock().dispatched.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.state.lock().cancelled.clone()
    }
}

#[async_trait]
impl ExecutionGateway for FakeGateway {
    async fn probe(&self, endpoint: &str) -> bool {
        !self.state.lock().unreachable.contains(endpoint)
    }

    async fn query_status(
        &self,
        _endpoint: &str,
        board_id: &str,
        _timeout: Duration,
    ) -> Result<String, GatewayError> {
        self.state
            .lock()
            .statuses
            .get(board_id)
            .cloned()
            .unwrap_or_else(|| Ok("Board Online".to_string()))
    }

    async fn dispatch(
        &self,
        _endpoint: &str,
        board_id: &str,
        task_name: &str,
        _job: &JobSpec,
    ) -> Result<String, GatewayError> {
        let stalled = self.state.lock().stalled_dispatch.contains(board_id);
        if stalled {
            futures::future::pending::<()>().await;
        }
        let mut state = self.state.lock();
        if state.failing_dispatch.contains(board_id) {
            return Err(GatewayError::Failed(format!("{board_id} refused the job")));
        }
        state
            .dispatched
            .push((board_id.to_string(), task_name.to_string()));
        Ok(format!("started {task_name} on {board_id}"))
    }

    async fn cancel_active(&self, _endpoint: &str, board_id: &str) -> Result<(), GatewayError> {
        self.state.lock().cancelled.push(board_id.to_string());
        Ok(())
    }
}

pub struct Fixture {
    pub manager: PoolManager<FakeGateway>,
    pub gateway: FakeGateway,
    pub notifier: Arc<InMemoryNotifier>,
}

pub fn fixture() -> Fixture {
    fixture_with(HealthConfig::default(), None)
}

pub fn fixture_with(health: HealthConfig, snapshot_dir: Option<&std::path::Path>) -> Fixture {
    let gateway = FakeGateway::default();
    let notifier = Arc::new(InMemoryNotifier::new(256));
    let mut builder = ManagerBuilder::new(gateway.clone())
        .notifier(notifier.clone())
        .ledger(Box::new(InMemoryJobLedger::new()))
        .health(health)
        .pool(POOL, PoolConfig::default());
    if let Some(dir) = snapshot_dir {
        builder = builder.snapshot_dir(dir);
    }
    Fixture {
        manager: builder.build().unwrap(),
        gateway,
        notifier,
    }
}

pub fn board(board_id: &str) -> Descriptor {
    Descriptor::new(board_id, "evb", format!("host-{board_id}"), format!("ep-{board_id}"))
}

pub fn job() -> JobSpec {
    JobSpec::new(["boot", "smoke"])
}

//! Builders to construct a pool manager from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{validate_pool_name, HealthConfig, PoolConfig, SchedulerConfig};
use crate::core::{ExecutionGateway, GuiNotifier, JobLedger, ResourcePool, SchedulerError};
use crate::infra::snapshot::{snapshot_path, PoolSnapshot};
use crate::infra::{InMemoryJobLedger, TracingNotifier};
use crate::scheduler::PoolManager;

/// Fluent construction of a [`PoolManager`].
pub struct ManagerBuilder<G: ExecutionGateway> {
    gateway: G,
    notifier: Arc<dyn GuiNotifier>,
    ledger: Box<dyn JobLedger>,
    health: HealthConfig,
    snapshot_dir: Option<PathBuf>,
    pools: Vec<(String, PoolConfig)>,
}

impl<G: ExecutionGateway> ManagerBuilder<G> {
    /// Builder with a logging notifier, an in-memory ledger, and no pools.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            notifier: Arc::new(TracingNotifier),
            ledger: Box::new(InMemoryJobLedger::new()),
            health: HealthConfig::default(),
            snapshot_dir: None,
            pools: Vec::new(),
        }
    }

    /// GUI notification transport.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn GuiNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Job ledger.
    #[must_use]
    pub fn ledger(mut self, ledger: Box<dyn JobLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Health monitor timing.
    #[must_use]
    pub const fn health(mut self, health: HealthConfig) -> Self {
        self.health = health;
        self
    }

    /// Persist and restore pool snapshots under `dir`.
    #[must_use]
    pub fn snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Add a pool.
    #[must_use]
    pub fn pool(mut self, name: impl Into<String>, config: PoolConfig) -> Self {
        self.pools.push((name.into(), config));
        self
    }

    /// Validate, create pools, and restore any snapshots found.
    ///
    /// A missing or empty snapshot file is skipped; a malformed one fails the build.
    pub fn build(self) -> Result<PoolManager<G>, SchedulerError> {
        if self.pools.is_empty() {
            return Err(SchedulerError::Config("at least one pool must be defined".into()));
        }
        self.health.validate().map_err(SchedulerError::Config)?;
        for (name, cfg) in &self.pools {
            validate_pool_name(name).map_err(SchedulerError::Config)?;
            cfg.validate()
                .map_err(|e| SchedulerError::Config(format!("pool `{name}` invalid: {e}")))?;
        }

        let manager = PoolManager::from_parts(
            self.gateway,
            self.notifier,
            self.ledger,
            self.health,
            self.snapshot_dir.clone(),
        );
        for (name, cfg) in &self.pools {
            manager.add_pool(
                ResourcePool::new(name.clone(), cfg.description.clone(), cfg.limits()),
                cfg.default_wait(),
            );
        }

        if let Some(dir) = &self.snapshot_dir {
            for (name, _) in &self.pools {
                let path = snapshot_path(dir, name);
                match PoolSnapshot::read_from(&path)? {
                    Some(snapshot) if snapshot.name == *name => {
                        manager.restore(snapshot)?;
                    }
                    Some(snapshot) => {
                        return Err(SchedulerError::Snapshot(format!(
                            "{} holds pool `{}`, expected `{name}`",
                            path.display(),
                            snapshot.name
                        )));
                    }
                    None => tracing::debug!(path = %path.display(), "no snapshot to restore"),
                }
            }
        }
        Ok(manager)
    }
}

/// Build a manager from scheduler configuration.
pub fn build_manager<G: ExecutionGateway>(
    cfg: &SchedulerConfig,
    gateway: G,
    notifier: Arc<dyn GuiNotifier>,
    ledger: Box<dyn JobLedger>,
) -> Result<PoolManager<G>, SchedulerError> {
    cfg.validate().map_err(SchedulerError::Config)?;

    let mut builder = ManagerBuilder::new(gateway)
        .notifier(notifier)
        .ledger(ledger)
        .health(cfg.health);
    if let Some(dir) = &cfg.snapshot_dir {
        builder = builder.snapshot_dir(dir.clone());
    }
    let mut names: Vec<&String> = cfg.pools.keys().collect();
    names.sort();
    for name in names {
        builder = builder.pool(name.clone(), cfg.pools[name].clone());
    }
    builder.build()
}

//! Pool and scheduler configuration structures.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, PoolLimits};

/// Name of the pool used when no configuration file is given.
pub const DEFAULT_POOL_NAME: &str = "cloudtest";
/// Description of the default pool.
pub const DEFAULT_POOL_DESCRIPTION: &str = "record all the registered board_id";
/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "BOARD_SCHEDULER_CONFIG";
/// Environment variable overriding the snapshot directory.
pub const SNAPSHOT_DIR_ENV: &str = "BOARD_SCHEDULER_SNAPSHOT_DIR";

/// Characters a pool name may not contain; the name doubles as a file name.
pub const INVALID_POOL_NAME_CHARS: &str = "<>:\"/\\|?*";

/// Reject names that are empty or unusable as a snapshot file name.
pub fn validate_pool_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("pool names must not be empty".into());
    }
    if name.contains(|c: char| c.is_control() || INVALID_POOL_NAME_CHARS.contains(c)) {
        return Err(format!(
            "pool name `{name}` may not contain control characters or any of {INVALID_POOL_NAME_CHARS}"
        ));
    }
    Ok(())
}

/// Pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Human-readable description, persisted in snapshots.
    #[serde(default)]
    pub description: String,
    /// Maximum number of devices.
    pub max_slots: usize,
    /// Maximum number of pending requests before rejection.
    pub max_pending: usize,
    /// Wait bound applied to blocking acquires that give none; absent means indefinite.
    #[serde(default)]
    pub default_wait_secs: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_POOL_DESCRIPTION.to_string(),
            max_slots: 1024,
            max_pending: 4096,
            default_wait_secs: None,
        }
    }
}

/// Health monitor timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Sleep between cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Bound on each on-device status query.
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,
    /// Unhealthy streak after which a device is evicted.
    #[serde(default = "default_eviction_threshold_secs")]
    pub eviction_threshold_secs: u64,
}

const fn default_interval_secs() -> u64 {
    5
}

const fn default_status_timeout_secs() -> u64 {
    5
}

const fn default_eviction_threshold_secs() -> u64 {
    43_200
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            status_timeout_secs: default_status_timeout_secs(),
            eviction_threshold_secs: default_eviction_threshold_secs(),
        }
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, PoolConfig>,
    /// Health monitor timing.
    #[serde(default)]
    pub health: HealthConfig,
    /// Directory holding `<pool>.rpl` snapshots; persistence is off when absent.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::single_pool(DEFAULT_POOL_NAME, PoolConfig::default())
    }
}

impl PoolConfig {
    /// Capacity limits for this pool.
    pub const fn limits(&self) -> PoolLimits {
        PoolLimits {
            max_slots: self.max_slots,
            max_pending: self.max_pending,
        }
    }

    /// Default blocking wait bound.
    pub fn default_wait(&self) -> Option<Duration> {
        self.default_wait_secs.map(Duration::from_secs)
    }

    /// Validate pool configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_slots == 0 {
            return Err("max_slots must be greater than 0".into());
        }
        if self.max_pending == 0 {
            return Err("max_pending must be greater than 0".into());
        }
        if self.default_wait_secs == Some(0) {
            return Err("default_wait_secs must be greater than 0 when set".into());
        }
        Ok(())
    }
}

impl HealthConfig {
    /// Sleep between cycles.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Status query bound.
    pub const fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    /// Validate timing values.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 {
            return Err("interval_secs must be greater than 0".into());
        }
        if self.status_timeout_secs == 0 {
            return Err("status_timeout_secs must be greater than 0".into());
        }
        if self.eviction_threshold_secs == 0 {
            return Err("eviction_threshold_secs must be greater than 0".into());
        }
        Ok(())
    }
}

impl SchedulerConfig {
    /// Configuration with one pool.
    pub fn single_pool(name: impl Into<String>, pool: PoolConfig) -> Self {
        Self {
            pools: HashMap::from([(name.into(), pool)]),
            health: HealthConfig::default(),
            snapshot_dir: None,
        }
    }

    /// Set the snapshot directory.
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Validate all pools and ensure at least one pool exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.pools.is_empty() {
            return Err("at least one pool must be defined".into());
        }
        for (name, pool) in &self.pools {
            validate_pool_name(name)?;
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        self.health
            .validate()
            .map_err(|e| format!("health invalid: {e}"))
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from the environment (after reading `.env` if present).
    ///
    /// Reads the JSON file named by `BOARD_SCHEDULER_CONFIG`, or falls back to
    /// the default single pool. `BOARD_SCHEDULER_SNAPSHOT_DIR` overrides the
    /// snapshot directory either way.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                Self::from_json_str(&text)
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("loading config file {path}"))?
            }
            Err(_) => Self::default(),
        };
        if let Ok(dir) = std::env::var(SNAPSHOT_DIR_ENV) {
            cfg.snapshot_dir = Some(PathBuf::from(dir));
        }
        Ok(cfg)
    }
}

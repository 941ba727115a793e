//! Configuration models for pools, health timing, and persistence.

pub mod pool;

pub use pool::{
    validate_pool_name, HealthConfig, PoolConfig, SchedulerConfig, CONFIG_PATH_ENV,
    DEFAULT_POOL_DESCRIPTION, DEFAULT_POOL_NAME, INVALID_POOL_NAME_CHARS, SNAPSHOT_DIR_ENV,
};

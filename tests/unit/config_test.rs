//! Tests for configuration validation

use board_scheduler::config::{HealthConfig, PoolConfig, SchedulerConfig, DEFAULT_POOL_NAME};

#[test]
fn test_pool_config_validation() {
    let valid = PoolConfig {
        description: "lab".to_string(),
        max_slots: 10,
        max_pending: 50,
        default_wait_secs: Some(60),
    };
    assert!(valid.validate().is_ok());
    assert_eq!(valid.limits().max_slots, 10);
    assert_eq!(valid.default_wait(), Some(std::time::Duration::from_secs(60)));
}

#[test]
fn test_pool_config_invalid_values() {
    let base = PoolConfig::default();
    assert!(PoolConfig { max_slots: 0, ..base.clone() }.validate().is_err());
    assert!(PoolConfig { max_pending: 0, ..base.clone() }.validate().is_err());
    assert!(PoolConfig { default_wait_secs: Some(0), ..base }.validate().is_err());
}

#[test]
fn test_health_config_invalid_values() {
    let base = HealthConfig::default();
    assert!(base.validate().is_ok());
    assert!(HealthConfig { interval_secs: 0, ..base }.validate().is_err());
    assert!(HealthConfig { eviction_threshold_secs: 0, ..base }.validate().is_err());
}

#[test]
fn test_default_scheduler_config() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert!(cfg.pools.contains_key(DEFAULT_POOL_NAME));
    assert_eq!(cfg.health.eviction_threshold_secs, 43_200);
    assert!(cfg.snapshot_dir.is_none());
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "pools": {
            "lab-a": { "max_slots": 8, "max_pending": 32 }
        },
        "health": { "interval_secs": 2 },
        "snapshot_dir": "/tmp/pools"
    }"#;
    let cfg = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.pools["lab-a"].max_slots, 8);
    assert_eq!(cfg.pools["lab-a"].default_wait_secs, None);
    assert_eq!(cfg.health.interval_secs, 2);
    assert_eq!(cfg.health.status_timeout_secs, 5);
    assert_eq!(cfg.snapshot_dir.as_deref(), Some(std::path::Path::new("/tmp/pools")));
}

#[test]
fn test_scheduler_config_rejects_empty_pools() {
    assert!(SchedulerConfig::from_json_str(r#"{ "pools": {} }"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_pool_names_must_be_file_safe() {
    use board_scheduler::config::validate_pool_name;
    assert!(validate_pool_name("lab-a_2").is_ok());
    assert!(validate_pool_name("").is_err());
    assert!(validate_pool_name("a/b").is_err());
    assert!(validate_pool_name("a\\b").is_err());
    assert!(validate_pool_name("tab\there").is_err());

    let json = r#"{ "pools": { "x|y": { "max_slots": 1, "max_pending": 1 } } }"#;
    assert!(SchedulerConfig::from_json_str(json).is_err());
}

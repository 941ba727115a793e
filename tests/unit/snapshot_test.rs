//! Tests for snapshot files on disk

use board_scheduler::core::Descriptor;
use board_scheduler::infra::snapshot::{snapshot_path, PoolSnapshot, SnapshotRecord};
use board_scheduler::SchedulerError;

fn sample() -> PoolSnapshot {
    PoolSnapshot {
        name: "cloudtest".to_string(),
        description: "record all the registered board_id".to_string(),
        records: vec![
            SnapshotRecord {
                id: 4,
                descriptor: Descriptor::new("B4", "evb", "host-4", "10.0.0.4")
                    .with("chip_name", "pxa1908")
                    .with("rack", "r2"),
            },
            SnapshotRecord {
                id: 9,
                descriptor: Descriptor::new("B9", "dkb", "host-9", "10.0.0.9"),
            },
        ],
    }
}

#[test]
fn test_write_then_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(dir.path(), "cloudtest");
    assert!(path.ends_with("cloudtest.rpl"));

    let snapshot = sample();
    snapshot.write_to(&path).unwrap();
    let loaded = PoolSnapshot::read_from(&path).unwrap().unwrap();
    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.records[0].descriptor.get("rack"), Some("r2"));
}

#[test]
fn test_missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(dir.path(), "absent");
    assert!(PoolSnapshot::read_from(&path).unwrap().is_none());
}

#[test]
fn test_truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(dir.path(), "cloudtest");
    let bytes = sample().encode().unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
    assert!(matches!(
        PoolSnapshot::read_from(&path),
        Err(SchedulerError::Snapshot(_))
    ));
}

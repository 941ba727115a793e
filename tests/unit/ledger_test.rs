//! Tests for the in-memory job ledger

use board_scheduler::core::{JobEvent, JobLedger, JobRecord, JobStatus};
use board_scheduler::infra::InMemoryJobLedger;

fn record(key: &str) -> JobRecord {
    JobRecord {
        key: key.to_string(),
        pool: "cloudtest".to_string(),
        task_name: "nightly".to_string(),
        board_id: "B1".to_string(),
        origin: "10.0.0.5".to_string(),
        history: vec![JobEvent {
            status: JobStatus::Started,
            at_ms: 1,
        }],
    }
}

#[test]
fn test_append_tracks_latest_status() {
    let mut ledger = InMemoryJobLedger::new();
    ledger.start(record("B1-1"));
    let updated = ledger
        .append("B1-1", JobStatus::Progress("case 3/10".into()))
        .unwrap();
    assert_eq!(updated.history.len(), 2);
    assert_eq!(
        ledger.get("B1-1").unwrap().status(),
        Some(&JobStatus::Progress("case 3/10".into()))
    );
    assert!(ledger.append("missing", JobStatus::Passed).is_none());
}

#[test]
fn test_records_keep_start_order() {
    let mut ledger = InMemoryJobLedger::new();
    ledger.start(record("B1-2"));
    ledger.start(record("B1-1"));
    ledger.start(record("B1-2"));
    let keys: Vec<String> = ledger.records().into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec!["B1-2", "B1-1"]);
}

#[test]
fn test_terminal_statuses() {
    assert!(JobStatus::Passed.is_terminal());
    assert!(JobStatus::Failed("x".into()).is_terminal());
    assert!(JobStatus::Cancelled.is_terminal());
    assert!(!JobStatus::Started.is_terminal());
    assert!(!JobStatus::Progress("x".into()).is_terminal());
}

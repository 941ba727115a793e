//! Tests for utility types

use board_scheduler::util::{now_ms, Priority};

#[test]
fn test_priority_ordering() {
    assert!(Priority::HIGHEST < Priority::DEFAULT);
    assert!(Priority::DEFAULT < Priority::LOWEST);
    assert_eq!(Priority::default().value(), 50);
}

#[test]
fn test_priority_range() {
    assert_eq!(Priority::new(1).unwrap(), Priority::HIGHEST);
    assert_eq!(Priority::new(99).unwrap(), Priority::LOWEST);
    assert!(Priority::new(0).is_err());
    assert!(Priority::try_from(100).is_err());
}

#[test]
fn test_priority_serde_rejects_out_of_range() {
    let p: Priority = serde_json::from_str("7").unwrap();
    assert_eq!(p.value(), 7);
    assert_eq!(serde_json::to_string(&p).unwrap(), "7");
    assert!(serde_json::from_str::<Priority>("0").is_err());
}

#[test]
fn test_clock_advances() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
    assert!(a > 0);
}

#[test]
fn test_init_tracing_is_idempotent() {
    board_scheduler::util::init_tracing();
    board_scheduler::util::init_tracing();
}

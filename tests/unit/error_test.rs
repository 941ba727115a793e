//! Tests for error types

use board_scheduler::core::SchedulerError;

#[test]
fn test_not_found_error() {
    let err = SchedulerError::NotFound("board B1".to_string());
    assert_eq!(format!("{}", err), "not found: board B1");
}

#[test]
fn test_not_owner_error() {
    let err = SchedulerError::NotOwner("board B1 is not owned".to_string());
    assert_eq!(format!("{}", err), "not owner: board B1 is not owned");
}

#[test]
fn test_no_match_error() {
    let err = SchedulerError::NoMatch("board_id=B9".to_string());
    assert_eq!(format!("{}", err), "no matching device for `board_id=B9`");
}

#[test]
fn test_timeout_error() {
    assert_eq!(
        format!("{}", SchedulerError::Timeout),
        "timed out waiting for a device"
    );
}

#[test]
fn test_io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err: SchedulerError = io.into();
    assert!(matches!(err, SchedulerError::Io(_)));
    assert!(err.to_string().starts_with("io error:"));
}

#[test]
fn test_pool_admin_errors() {
    assert_eq!(
        SchedulerError::AlreadyExists("pool lab".into()).to_string(),
        "already exists: pool lab"
    );
    assert_eq!(
        SchedulerError::PoolBusy("pool lab".into()).to_string(),
        "pool in use: pool lab"
    );
}

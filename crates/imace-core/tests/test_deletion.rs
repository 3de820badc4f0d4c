use imace_core::deletion::{DeleteState, DeletionGuard};
use imace_core::error::ImaceError;

#[test]
fn test_starts_idle() {
    let guard = DeletionGuard::new();
    assert_eq!(guard.state(), DeleteState::Idle);
    assert!(guard.last_error().is_none());
}

#[test]
fn test_request_then_cancel() {
    let mut guard = DeletionGuard::new();
    guard.request_delete();
    assert_eq!(guard.state(), DeleteState::Confirming);
    guard.cancel_delete_confirm();
    assert_eq!(guard.state(), DeleteState::Idle);
}

#[test]
fn test_confirm_without_request_does_nothing() {
    let mut guard = DeletionGuard::new();
    assert!(!guard.confirm_delete());
    assert_eq!(guard.state(), DeleteState::Idle);
}

#[test]
fn test_confirm_only_once() {
    let mut guard = DeletionGuard::new();
    guard.request_delete();
    assert!(guard.confirm_delete());
    assert!(guard.is_deleting());
    assert!(!guard.confirm_delete());
    // Neither a new request nor a cancel interrupts a running delete.
    guard.request_delete();
    guard.cancel_delete_confirm();
    assert_eq!(guard.state(), DeleteState::Deleting);
}

#[test]
fn test_success_returns_to_idle() {
    let mut guard = DeletionGuard::new();
    guard.request_delete();
    guard.confirm_delete();
    guard.finish_delete(&Ok(()));
    assert_eq!(guard.state(), DeleteState::Idle);
    assert!(guard.last_error().is_none());
}

#[test]
fn test_failure_surfaces_error_until_next_request() {
    let mut guard = DeletionGuard::new();
    guard.request_delete();
    guard.confirm_delete();
    guard.finish_delete(&Err(ImaceError::DeleteFailure("503".into())));
    assert_eq!(guard.state(), DeleteState::Idle);
    assert_eq!(guard.last_error(), Some("Delete failed: 503"));

    guard.request_delete();
    assert!(guard.last_error().is_none());
}

#[test]
fn test_finish_while_idle_is_ignored() {
    let mut guard = DeletionGuard::new();
    guard.finish_delete(&Err(ImaceError::DeleteFailure("late".into())));
    assert!(guard.last_error().is_none());
}

#[test]
fn test_state_display() {
    assert_eq!(DeleteState::Confirming.to_string(), "Awaiting confirmation");
}

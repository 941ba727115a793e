//! Tests for notifier adapters

use board_scheduler::core::{GuiNotifier, NotifyKind};
use board_scheduler::infra::{InMemoryNotifier, TracingNotifier};

#[test]
fn test_in_memory_notifier_keeps_most_recent() {
    let notifier = InMemoryNotifier::new(2);
    notifier.notify(NotifyKind::DeviceChanged, "B1", "gui-1");
    notifier.notify(NotifyKind::JobAssigned, "T1;B1", "10.0.0.5");
    notifier.notify(NotifyKind::JobUpdated, "B1-1", "10.0.0.5");

    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, NotifyKind::JobAssigned);
    assert_eq!(events[1].payload, "B1-1");
    assert_eq!(notifier.of_kind(NotifyKind::JobUpdated).len(), 1);
    assert!(notifier.of_kind(NotifyKind::DeviceChanged).is_empty());
}

#[test]
fn test_tracing_notifier_accepts_events() {
    TracingNotifier.notify(NotifyKind::DeviceChanged, "B1", "gui-1");
}

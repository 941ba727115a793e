//! Infrastructure adapters: snapshot persistence, notifiers, and ledgers.

pub mod ledger;
pub mod notifier;
pub mod snapshot;

pub use ledger::InMemoryJobLedger;
pub use notifier::{InMemoryNotifier, Notification, TracingNotifier};
pub use snapshot::{snapshot_path, PoolSnapshot, SnapshotRecord, FORMAT_VERSION};

//! Device model, matcher, pool bookkeeping, and collaborator seams.

pub mod device;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod predicate;
pub mod registry;
pub mod request;
pub mod resource_pool;

pub use device::{Descriptor, Device, DeviceSnapshot, Health, KNOWN_FIELDS, OFFLINE_STATUS, ONLINE_MARKER};
pub use error::{AppResult, SchedulerError};
pub use gateway::{ExecutionGateway, GatewayError, GuiNotifier, JobSpec, NotifyKind};
pub use ledger::{JobEvent, JobLedger, JobRecord, JobStatus};
pub use predicate::{matches, LeasePolicy, MatchOutcome, Predicate};
pub use registry::{BoardPattern, DeviceRegistry, Registration};
pub use request::{
    AcquireOutcome, AcquireRequest, CancelFilter, Cancelled, RequestView, Selection, WaitMode,
};
pub use resource_pool::{PoolLimits, PoolView, Released, ResourcePool, SlotView};

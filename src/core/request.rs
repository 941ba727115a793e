//! Acquire requests, pending/ready queue entries, and cancel filters.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::core::device::Device;
use crate::core::gateway::JobSpec;
use crate::core::predicate::Predicate;
use crate::core::SchedulerError;
use crate::util::serde::{Priority, RequestId};

/// How a request picks its device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// A uniformly random free slot.
    Any,
    /// The first free slot in slot order.
    First,
    /// The first free slot whose device satisfies the predicate.
    Predicate(Predicate),
}

impl Selection {
    /// Parse a predicate selection.
    pub fn predicate(expr: &str) -> Result<Self, SchedulerError> {
        Predicate::parse(expr).map(Self::Predicate)
    }

    /// Predicate text, or the empty string for `Any`/`First`.
    pub fn text(&self) -> &str {
        match self {
            Self::Predicate(p) => p.as_str(),
            Self::Any | Self::First => "",
        }
    }
}

/// How the caller waits when no device is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Queue and wait for a grant; `None` waits indefinitely.
    Blocking {
        /// Upper bound on the wait.
        timeout: Option<Duration>,
    },
    /// Queue and return immediately; the grant is dispatched by the health monitor.
    Async,
    /// Never queue; fail when nothing is free.
    Immediate,
}

/// Arguments of an acquire call.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    /// Name of the requesting task.
    pub task_name: String,
    /// Device selection mode.
    pub selection: Selection,
    /// Queue priority.
    pub priority: Priority,
    /// Waiting behavior.
    pub wait: WaitMode,
    /// Job to dispatch on grant; `None` is a dry run.
    pub job: Option<JobSpec>,
    /// Endpoint of the requester, used for notifications and cancel narrowing.
    pub origin: String,
}

impl AcquireRequest {
    /// Blocking dry-run request with default priority and no timeout.
    pub fn new(task_name: impl Into<String>, selection: Selection) -> Self {
        Self {
            task_name: task_name.into(),
            selection,
            priority: Priority::default(),
            wait: WaitMode::Blocking { timeout: None },
            job: None,
            origin: "local".to_string(),
        }
    }

    /// Set the queue priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Block up to `timeout` (forever when `None`).
    #[must_use]
    pub const fn blocking(mut self, timeout: Option<Duration>) -> Self {
        self.wait = WaitMode::Blocking { timeout };
        self
    }

    /// Return immediately with a queued status when nothing is free.
    #[must_use]
    pub const fn asynchronous(mut self) -> Self {
        self.wait = WaitMode::Async;
        self
    }

    /// Fail instead of queueing.
    #[must_use]
    pub const fn immediate(mut self) -> Self {
        self.wait = WaitMode::Immediate;
        self
    }

    /// Dispatch `job` once a device is granted.
    #[must_use]
    pub fn with_job(mut self, job: JobSpec) -> Self {
        self.job = Some(job);
        self
    }

    /// Record the requester's endpoint.
    #[must_use]
    pub fn from_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}

/// Result of a successful acquire call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireOutcome {
    /// The caller owns `board_id`; `dispatch` holds the gateway result when a job ran.
    Granted {
        /// Granted board.
        board_id: String,
        /// Gateway result text, absent for dry runs.
        dispatch: Option<String>,
    },
    /// No device was free; the request waits in the pending queue.
    Queued {
        /// Handle for cancel and query.
        request_id: RequestId,
    },
}

impl AcquireOutcome {
    /// Granted board id, if any.
    pub fn board_id(&self) -> Option<&str> {
        match self {
            Self::Granted { board_id, .. } => Some(board_id),
            Self::Queued { .. } => None,
        }
    }
}

/// Grant delivered to a blocked caller.
#[derive(Debug)]
pub(crate) struct Grant {
    pub(crate) device: Arc<Device>,
}

/// An unsatisfied acquire call.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    pub(crate) id: RequestId,
    pub(crate) task_name: String,
    pub(crate) selection: Selection,
    pub(crate) priority: Priority,
    pub(crate) submitted_at_ms: u128,
    pub(crate) origin: String,
    pub(crate) job: Option<JobSpec>,
    /// Present iff the caller is blocked; consuming it writes the outcome once.
    pub(crate) waiter: Option<oneshot::Sender<Grant>>,
}

impl PendingRequest {
    /// Blocked caller went away (timeout raced or future dropped).
    pub(crate) fn is_abandoned(&self) -> bool {
        self.waiter.as_ref().is_some_and(oneshot::Sender::is_closed)
    }

    pub(crate) fn view(&self) -> RequestView {
        RequestView {
            request_id: self.id,
            task_name: self.task_name.clone(),
            origin: self.origin.clone(),
            submitted_at_ms: self.submitted_at_ms,
            priority: self.priority,
            predicate: predicate_label(&self.selection),
            synchronous: self.waiter.is_some(),
            board_id: None,
        }
    }
}

/// An asynchronous request that has a device but has not been dispatched.
#[derive(Debug)]
pub(crate) struct ReadyEntry {
    pub(crate) request: PendingRequest,
    pub(crate) device: Arc<Device>,
}

impl ReadyEntry {
    pub(crate) fn view(&self) -> RequestView {
        let mut view = self.request.view();
        view.board_id = Some(self.device.board_id().to_string());
        view
    }
}

fn predicate_label(selection: &Selection) -> String {
    match selection {
        Selection::Predicate(p) if !p.as_str().is_empty() => p.as_str().to_string(),
        _ => "none".to_string(),
    }
}

/// Observable view of a pending or ready request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestView {
    /// Request id.
    pub request_id: RequestId,
    /// Task name.
    pub task_name: String,
    /// Requester endpoint.
    pub origin: String,
    /// Submission time, milliseconds since epoch.
    pub submitted_at_ms: u128,
    /// Priority.
    pub priority: Priority,
    /// Predicate text or `none`.
    pub predicate: String,
    /// A caller is blocked on this request.
    pub synchronous: bool,
    /// Assigned board (ready entries only).
    pub board_id: Option<String>,
}

/// Identifies a pending request to cancel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelFilter {
    /// Exact predicate text; empty selects `Any`/`First` requests.
    pub predicate: String,
    /// Narrow to requests from this endpoint.
    pub origin: Option<String>,
    /// Narrow to requests with this task name.
    pub task_name: Option<String>,
}

impl CancelFilter {
    /// Match on predicate text alone.
    pub fn entry(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            ..Self::default()
        }
    }

    /// Also require the originating endpoint.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Also require the task name.
    #[must_use]
    pub fn with_task(mut self, task_name: impl Into<String>) -> Self {
        self.task_name = Some(task_name.into());
        self
    }

    pub(crate) fn matches(&self, request: &PendingRequest) -> bool {
        request.selection.text() == self.predicate
            && self.origin.as_ref().is_none_or(|o| *o == request.origin)
            && self.task_name.as_ref().is_none_or(|t| *t == request.task_name)
    }
}

/// A cancelled pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancelled {
    /// Request id.
    pub request_id: RequestId,
    /// Task name.
    pub task_name: String,
}

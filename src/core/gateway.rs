//! Seams to external collaborators: the execution gateway and GUI notifier.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Work to run on a granted board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Test cases to run, in order.
    pub cases: Vec<String>,
    /// Opaque job configuration forwarded to the gateway.
    pub config: String,
}

impl JobSpec {
    /// Job running `cases` with an empty configuration.
    pub fn new<I, S>(cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cases: cases.into_iter().map(Into::into).collect(),
            config: String::new(),
        }
    }

    /// Attach a configuration blob.
    #[must_use]
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }
}

/// Failures reported by a gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The remote side did not answer in time.
    #[error("gateway timeout")]
    Timeout,
    /// The remote side answered with an error or could not be reached.
    #[error("gateway failure: {0}")]
    Failed(String),
}

/// Remote command execution against board hosts.
///
/// Calls are unbounded unless the gateway applies its own limits; the
/// scheduler only bounds `query_status`.
#[async_trait]
pub trait ExecutionGateway: Send + Sync + 'static {
    /// Liveness of the host machine behind `endpoint`.
    async fn probe(&self, endpoint: &str) -> bool;

    /// On-device status text.
    async fn query_status(
        &self,
        endpoint: &str,
        board_id: &str,
        timeout: Duration,
    ) -> Result<String, GatewayError>;

    /// Launch `job` for `task_name` on the board; returns the gateway's result text.
    async fn dispatch(
        &self,
        endpoint: &str,
        board_id: &str,
        task_name: &str,
        job: &JobSpec,
    ) -> Result<String, GatewayError>;

    /// Cancel whatever is running on the board.
    async fn cancel_active(&self, endpoint: &str, board_id: &str) -> Result<(), GatewayError>;
}

/// Kinds of GUI notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyKind {
    /// Device list or a device's status changed.
    DeviceChanged,
    /// A queued request was given a board.
    JobAssigned,
    /// A job reported progress or completion.
    JobUpdated,
}

/// Fire-and-forget GUI notification transport. Implementations must not block.
pub trait GuiNotifier: Send + Sync {
    /// Deliver `payload` of `kind` to `target` on a best-effort basis.
    fn notify(&self, kind: NotifyKind, payload: &str, target: &str);
}

//! Job-status ledger interface.

use serde::{Deserialize, Serialize};

/// Status of a dispatched job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Dispatch succeeded.
    Started,
    /// Progress message from the board.
    Progress(String),
    /// Job finished and passed.
    Passed,
    /// Job finished with a failure.
    Failed(String),
    /// Job was cancelled.
    Cancelled,
}

impl JobStatus {
    /// True for statuses that end a job.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed(_) | Self::Cancelled)
    }
}

/// One status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    /// Status entered.
    pub status: JobStatus,
    /// Milliseconds since epoch.
    pub at_ms: u128,
}

/// A job and its status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Ledger key, `<board_id>-<start ms>`.
    pub key: String,
    /// Pool the board belongs to.
    pub pool: String,
    /// Task that owns the job.
    pub task_name: String,
    /// Board the job runs on.
    pub board_id: String,
    /// Endpoint of the requester.
    pub origin: String,
    /// Appended status changes, oldest first.
    pub history: Vec<JobEvent>,
}

impl JobRecord {
    /// Most recent status.
    pub fn status(&self) -> Option<&JobStatus> {
        self.history.last().map(|e| &e.status)
    }
}

/// Keyed append log of job status.
pub trait JobLedger: Send {
    /// Store a new record, replacing any record with the same key.
    fn start(&mut self, record: JobRecord);
    /// Append a status; returns the updated record, or `None` for an unknown key.
    fn append(&mut self, key: &str, status: JobStatus) -> Option<JobRecord>;
    /// Fetch a record.
    fn get(&self, key: &str) -> Option<JobRecord>;
    /// All records in start order.
    fn records(&self) -> Vec<JobRecord>;
}

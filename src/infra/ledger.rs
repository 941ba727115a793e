//! In-memory job ledger.

use std::collections::HashMap;

use crate::core::{JobEvent, JobLedger, JobRecord, JobStatus};
use crate::util::clock::now_ms;

/// Simple in-memory ledger for development/testing.
#[derive(Debug, Default)]
pub struct InMemoryJobLedger {
    records: HashMap<String, JobRecord>,
    order: Vec<String>,
}

impl InMemoryJobLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobLedger for InMemoryJobLedger {
    fn start(&mut self, record: JobRecord) {
        if self.records.insert(record.key.clone(), record.clone()).is_none() {
            self.order.push(record.key);
        }
    }

    fn append(&mut self, key: &str, status: JobStatus) -> Option<JobRecord> {
        let record = self.records.get_mut(key)?;
        record.history.push(JobEvent {
            status,
            at_ms: now_ms(),
        });
        Some(record.clone())
    }

    fn get(&self, key: &str) -> Option<JobRecord> {
        self.records.get(key).cloned()
    }

    fn records(&self) -> Vec<JobRecord> {
        self.order
            .iter()
            .filter_map(|k| self.records.get(k).cloned())
            .collect()
    }
}

//! Serializable identifiers and value types shared across modules.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::SchedulerError;

/// Identifier of a pending acquire request.
pub type RequestId = Uuid;

/// Registry-assigned numeric device identifier.
pub type DeviceId = u64;

/// Request priority. Smaller values are served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Priority(u8);

impl Priority {
    /// Most urgent priority.
    pub const HIGHEST: Self = Self(1);
    /// Least urgent priority.
    pub const LOWEST: Self = Self(99);
    /// Priority used when the caller does not specify one.
    pub const DEFAULT: Self = Self(50);

    /// Build a priority, rejecting values outside `1..=99`.
    pub fn new(value: u32) -> Result<Self, SchedulerError> {
        if (1..=99).contains(&value) {
            #[allow(clippy::cast_possible_truncation)]
            Ok(Self(value as u8))
        } else {
            Err(SchedulerError::InvalidRequest(format!(
                "priority {value} outside 1..=99"
            )))
        }
    }

    /// Numeric value.
    pub const fn value(self) -> u32 {
        self.0 as u32
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Priority {
    type Error = SchedulerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u32 {
    fn from(p: Priority) -> Self {
        p.value()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

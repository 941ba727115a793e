//! Attribute predicates: `key=value` clauses joined by `&&`.
//!
//! Two pseudo-keys change how a match behaves instead of testing a field:
//! `ignore_offline` skips the health gate, and `lock_task` takes the device
//! lease on a successful match. Either may be written bare or with a value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::device::Device;
use crate::core::SchedulerError;

/// Separator between clauses.
pub const CLAUSE_SEPARATOR: &str = "&&";
/// Pseudo-key disabling the health gate.
pub const IGNORE_OFFLINE: &str = "ignore_offline";
/// Pseudo-key requesting a lease.
pub const LOCK_TASK: &str = "lock_task";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    key: String,
    value: String,
}

/// A parsed conjunctive attribute query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Predicate {
    raw: String,
    clauses: Vec<Clause>,
    ignore_offline: bool,
    lock_task: bool,
}

/// Whether a successful match may take the lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeasePolicy {
    /// Take the lease when the predicate carries `lock_task`.
    Apply,
    /// Evaluate only; never mutate the device.
    Probe,
}

/// Result of matching a predicate against a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    /// All clauses held and the device passed the lease and health gates.
    pub matched: bool,
    /// This call set the device's lease.
    pub lease_granted: bool,
}

impl Predicate {
    /// Parse a predicate. The empty string matches every device.
    ///
    /// A clause without `=`, with an empty key, or an empty clause between
    /// separators is rejected.
    pub fn parse(expr: &str) -> Result<Self, SchedulerError> {
        let mut predicate = Self {
            raw: expr.to_string(),
            clauses: Vec::new(),
            ignore_offline: false,
            lock_task: false,
        };
        if expr.is_empty() {
            return Ok(predicate);
        }
        for part in expr.split(CLAUSE_SEPARATOR) {
            if part.is_empty() {
                return Err(SchedulerError::InvalidPredicate(format!(
                    "empty clause in `{expr}`"
                )));
            }
            let (key, value) = match part.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (part, None),
            };
            match key {
                IGNORE_OFFLINE => predicate.ignore_offline = true,
                LOCK_TASK => predicate.lock_task = true,
                "" => {
                    return Err(SchedulerError::InvalidPredicate(format!(
                        "clause `{part}` has no key"
                    )))
                }
                _ => {
                    let Some(value) = value else {
                        return Err(SchedulerError::InvalidPredicate(format!(
                            "clause `{part}` is missing `=`"
                        )));
                    };
                    predicate.clauses.push(Clause {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(predicate)
    }

    /// Original text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when a successful match should take the lease.
    pub const fn wants_lease(&self) -> bool {
        self.lock_task
    }

    /// True when the health gate is disabled.
    pub const fn ignores_offline(&self) -> bool {
        self.ignore_offline
    }

    /// Attribute clauses and health gate, ignoring the lease flag.
    pub(crate) fn matches_attributes(&self, device: &Device) -> bool {
        if !self.ignore_offline && !device.passes_health_gate() {
            return false;
        }
        device.with_descriptor(|d| {
            self.clauses
                .iter()
                .all(|c| d.get(&c.key).unwrap_or_default() == c.value)
        })
    }

    /// Evaluate against `device`, taking the lease when asked and allowed.
    ///
    /// A leased device never matches. With `lock_task` and [`LeasePolicy::Apply`],
    /// an idle device is leased atomically; losing that race to another caller
    /// turns the match into a miss. A busy device still matches but is not leased.
    pub fn matches(&self, device: &Device, policy: LeasePolicy) -> MatchOutcome {
        if device.is_leased() || !self.matches_attributes(device) {
            return MatchOutcome::default();
        }
        if !(self.lock_task && policy == LeasePolicy::Apply) || device.is_busy() {
            return MatchOutcome {
                matched: true,
                lease_granted: false,
            };
        }
        if device.try_lease() {
            tracing::debug!(board_id = %device.board_id(), "lease taken by predicate match");
            MatchOutcome {
                matched: true,
                lease_granted: true,
            }
        } else {
            MatchOutcome::default()
        }
    }
}

impl FromStr for Predicate {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Predicate {
    type Error = SchedulerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Predicate> for String {
    fn from(p: Predicate) -> Self {
        p.raw
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Free-function form of [`Predicate::matches`].
pub fn matches(device: &Device, predicate: &Predicate, policy: LeasePolicy) -> MatchOutcome {
    predicate.matches(device, policy)
}

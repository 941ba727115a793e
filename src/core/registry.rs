//! Device registry: membership, id assignment, and board-id lookup.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use regex::Regex;

use crate::core::device::{Descriptor, Device};
use crate::core::SchedulerError;
use crate::util::serde::DeviceId;

/// Selects devices by exact board id or by a case-insensitive `*`/`?` wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardPattern {
    /// Exact board id.
    Exact(String),
    /// Shell-style wildcard, matched case-insensitively.
    Wildcard(String),
}

impl BoardPattern {
    /// Exact pattern.
    pub fn exact(board_id: impl Into<String>) -> Self {
        Self::Exact(board_id.into())
    }

    /// Wildcard pattern.
    pub fn wildcard(pattern: impl Into<String>) -> Self {
        Self::Wildcard(pattern.into())
    }

    pub(crate) fn compile(&self) -> Result<CompiledPattern, SchedulerError> {
        match self {
            Self::Exact(id) => Ok(CompiledPattern::Exact(id.clone())),
            Self::Wildcard(glob) => {
                let mut re = String::from("(?i)^");
                for c in glob.chars() {
                    match c {
                        '*' => re.push_str(".*"),
                        '?' => re.push('.'),
                        other => re.push_str(&regex::escape(&other.to_string())),
                    }
                }
                re.push('$');
                Regex::new(&re)
                    .map(CompiledPattern::Wildcard)
                    .map_err(|e| SchedulerError::InvalidRequest(format!("bad pattern `{glob}`: {e}")))
            }
        }
    }
}

pub(crate) enum CompiledPattern {
    Exact(String),
    Wildcard(Regex),
}

impl CompiledPattern {
    pub(crate) fn is_match(&self, board_id: &str) -> bool {
        match self {
            Self::Exact(id) => id == board_id,
            Self::Wildcard(re) => re.is_match(board_id),
        }
    }
}

/// Result of an insert-or-update registration.
#[derive(Debug, Clone)]
pub enum Registration {
    /// A new device was created.
    Inserted(Arc<Device>),
    /// An existing device had its descriptor replaced.
    Updated(Arc<Device>),
}

impl Registration {
    /// The registered device.
    pub const fn device(&self) -> &Arc<Device> {
        match self {
            Self::Inserted(d) | Self::Updated(d) => d,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RegistryEntry {
    pub(crate) device: Arc<Device>,
    pub(crate) pool: String,
}

/// Registry contents; reached through [`DeviceRegistry::read`]/[`DeviceRegistry::write`]
/// so the manager can hold it across a pool lock (registry first, then pool).
#[derive(Debug)]
pub(crate) struct RegistryState {
    devices: HashMap<String, RegistryEntry>,
    next_id: DeviceId,
}

impl RegistryState {
    pub(crate) fn get(&self, board_id: &str) -> Option<&RegistryEntry> {
        self.devices.get(board_id)
    }

    /// Insert a new device into `pool`, or update the descriptor of an existing one.
    pub(crate) fn upsert(
        &mut self,
        pool: &str,
        descriptor: Descriptor,
    ) -> Result<Registration, SchedulerError> {
        let board_id = descriptor.board_id().to_string();
        if board_id.is_empty() {
            return Err(SchedulerError::InvalidRequest("board_id is empty".into()));
        }
        if let Some(entry) = self.devices.get(&board_id) {
            if entry.pool != pool {
                return Err(SchedulerError::InvalidRequest(format!(
                    "board {board_id} already registered in pool {}",
                    entry.pool
                )));
            }
            entry.device.update_descriptor(descriptor);
            return Ok(Registration::Updated(entry.device.clone()));
        }
        let id = self.next_id;
        self.next_id += 1;
        let device = Arc::new(Device::new(id, descriptor));
        self.devices.insert(
            board_id,
            RegistryEntry {
                device: device.clone(),
                pool: pool.to_string(),
            },
        );
        Ok(Registration::Inserted(device))
    }

    /// Insert a device with a known id (snapshot restore).
    pub(crate) fn restore(
        &mut self,
        pool: &str,
        id: DeviceId,
        descriptor: Descriptor,
    ) -> Result<Arc<Device>, SchedulerError> {
        let board_id = descriptor.board_id().to_string();
        if self.devices.contains_key(&board_id) {
            return Err(SchedulerError::Snapshot(format!(
                "duplicate board {board_id} in pool {pool}"
            )));
        }
        let device = Arc::new(Device::new(id, descriptor));
        self.next_id = self.next_id.max(id + 1);
        self.devices.insert(
            board_id,
            RegistryEntry {
                device: device.clone(),
                pool: pool.to_string(),
            },
        );
        Ok(device)
    }

    /// Remove a device. The id counter restarts once the registry is empty.
    pub(crate) fn remove(&mut self, board_id: &str) -> Option<RegistryEntry> {
        let removed = self.devices.remove(board_id);
        if removed.is_some() && self.devices.is_empty() {
            self.next_id = 1;
        }
        removed
    }

    pub(crate) fn matching(&self, pattern: &CompiledPattern) -> Vec<&RegistryEntry> {
        let mut hits: Vec<&RegistryEntry> = self
            .devices
            .values()
            .filter(|e| pattern.is_match(e.device.board_id()))
            .collect();
        hits.sort_by_key(|e| e.device.id());
        hits
    }

    pub(crate) fn devices(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.values().map(|e| &e.device)
    }

    pub(crate) fn len(&self) -> usize {
        self.devices.len()
    }

    pub(crate) const fn next_id(&self) -> DeviceId {
        self.next_id
    }
}

/// The set of known devices, keyed by board id.
#[derive(Debug)]
pub struct DeviceRegistry {
    state: RwLock<RegistryState>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    /// Empty registry; the first device gets id 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                devices: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write()
    }

    /// Look up a device by board id.
    pub fn get(&self, board_id: &str) -> Option<Arc<Device>> {
        self.read().get(board_id).map(|e| e.device.clone())
    }

    /// Copy of every device handle, ordered by id.
    pub fn snapshot(&self) -> Vec<Arc<Device>> {
        let mut devices: Vec<Arc<Device>> = self.read().devices().cloned().collect();
        devices.sort_by_key(|d| d.id());
        devices
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no device is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

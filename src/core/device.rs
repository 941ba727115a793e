//! Device model: static descriptor, live health, and lease/busy flags.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;
use crate::util::serde::DeviceId;

/// Descriptor fields every device carries, in persisted order.
///
/// The predicate matcher and the snapshot codec both read this list; fields
/// outside it are still stored and matched, and persist after these.
pub const KNOWN_FIELDS: &[&str] = &[
    "board_id",
    "board_type",
    "machine",
    "endpoint",
    "chip_name",
    "chip_stepping",
    "board_register_date",
    "board_status",
    "user_team",
    "current_user",
    "board_eco",
    "lcd_resolution",
    "lcd_screensize",
    "ddr_type",
    "ddr_size",
    "emmc_type",
    "emmc_size",
    "rf_name",
    "rf_type",
    "serial",
    "mcu",
    "usb",
    "username",
    "userteam",
    "dro",
    "chip_type",
];

/// Substring of a status report that marks a board as healthy.
pub const ONLINE_MARKER: &str = "Online";

/// Status recorded when the host machine does not answer a probe.
pub const OFFLINE_STATUS: &str = "offline";

/// Ordered key/value attributes describing a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    fields: Vec<(String, String)>,
}

impl Descriptor {
    /// Descriptor with every known field present (empty unless given here).
    pub fn new(
        board_id: impl Into<String>,
        board_type: impl Into<String>,
        machine: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        let mut fields: Vec<(String, String)> = KNOWN_FIELDS
            .iter()
            .map(|k| ((*k).to_string(), String::new()))
            .collect();
        fields[0].1 = board_id.into();
        fields[1].1 = board_type.into();
        fields[2].1 = machine.into();
        fields[3].1 = endpoint.into();
        Self { fields }
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing an existing value or appending a new key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Field value, if the key is present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The board identifier.
    pub fn board_id(&self) -> &str {
        self.get("board_id").unwrap_or_default()
    }

    /// Endpoint of the host machine that fronts the board.
    pub fn endpoint(&self) -> &str {
        self.get("endpoint").unwrap_or_default()
    }

    /// All fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fields that are not part of [`KNOWN_FIELDS`], in insertion order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !KNOWN_FIELDS.contains(k))
    }
}

/// Live health of a device, written only by the health monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// The host machine answered the last liveness probe.
    pub reachable: bool,
    /// Flattened text of the last on-device status query.
    pub status: String,
    /// Seconds the device has continuously failed its health check.
    pub unhealthy_streak_secs: u64,
}

impl Default for Health {
    fn default() -> Self {
        // Reachable until the first probe says otherwise.
        Self {
            reachable: true,
            status: String::new(),
            unhealthy_streak_secs: 0,
        }
    }
}

impl Health {
    /// True when the status is empty or reports the board online.
    pub fn status_ok(&self) -> bool {
        self.status.is_empty() || self.status.contains(ONLINE_MARKER)
    }
}

/// A registered physical board.
///
/// Descriptor and health live behind per-device locks so the matcher can read
/// them without the registry lock; `leased` and `busy` are atomics.
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    board_id: String,
    descriptor: RwLock<Descriptor>,
    health: RwLock<Health>,
    leased: AtomicBool,
    busy: AtomicBool,
    registered_at_ms: u128,
}

impl Device {
    /// Create a device with fresh health and no lease.
    pub fn new(id: DeviceId, descriptor: Descriptor) -> Self {
        Self {
            id,
            board_id: descriptor.board_id().to_string(),
            descriptor: RwLock::new(descriptor),
            health: RwLock::new(Health::default()),
            leased: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            registered_at_ms: now_ms(),
        }
    }

    /// Registry-assigned id.
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Human-assigned board id.
    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Copy of the descriptor.
    pub fn descriptor(&self) -> Descriptor {
        self.descriptor.read().clone()
    }

    /// Endpoint of the host machine.
    pub fn endpoint(&self) -> String {
        self.descriptor.read().endpoint().to_string()
    }

    /// Copy of the current health.
    pub fn health(&self) -> Health {
        self.health.read().clone()
    }

    /// Whether a lease is held.
    pub fn is_leased(&self) -> bool {
        self.leased.load(Ordering::Acquire)
    }

    /// Whether a job is dispatched to the device.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run `f` against the descriptor under a read lock.
    pub(crate) fn with_descriptor<R>(&self, f: impl FnOnce(&Descriptor) -> R) -> R {
        f(&self.descriptor.read())
    }

    /// Health gate: reachable and reporting online (or nothing yet).
    pub(crate) fn passes_health_gate(&self) -> bool {
        let health = self.health.read();
        health.reachable && health.status_ok()
    }

    /// Take the lease if the device is idle and unleased.
    pub(crate) fn try_lease(&self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.leased
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set_leased(&self, leased: bool) {
        self.leased.store(leased, Ordering::Release);
    }

    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }

    /// Replace the descriptor (board id is the registry key and is kept) and reset the streak.
    pub(crate) fn update_descriptor(&self, mut descriptor: Descriptor) {
        descriptor.set("board_id", self.board_id.clone());
        *self.descriptor.write() = descriptor;
        self.health.write().unhealthy_streak_secs = 0;
    }

    /// Store a probe result. Returns true if the status text changed.
    pub(crate) fn record_probe(&self, reachable: bool, status: String) -> bool {
        let mut health = self.health.write();
        let changed = health.status != status;
        health.reachable = reachable;
        health.status = status;
        changed
    }

    /// Grow or reset the unhealthy streak; returns the new value.
    pub(crate) fn accumulate_streak(&self, cycle_secs: u64) -> u64 {
        let mut health = self.health.write();
        if health.status.contains(ONLINE_MARKER) {
            health.unhealthy_streak_secs = 0;
        } else {
            health.unhealthy_streak_secs = health.unhealthy_streak_secs.saturating_add(cycle_secs);
        }
        health.unhealthy_streak_secs
    }

    /// Clear streak, lease, and busy flag.
    pub(crate) fn reset_runtime_state(&self) {
        self.health.write().unhealthy_streak_secs = 0;
        self.set_leased(false);
        self.set_busy(false);
    }

    /// Serializable view for listings.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            id: self.id,
            board_id: self.board_id.clone(),
            descriptor: self.descriptor(),
            health: self.health(),
            leased: self.is_leased(),
            busy: self.is_busy(),
            registered_at_ms: self.registered_at_ms,
        }
    }
}

/// Point-in-time copy of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Registry-assigned id.
    pub id: DeviceId,
    /// Board id.
    pub board_id: String,
    /// Static attributes.
    pub descriptor: Descriptor,
    /// Live health.
    pub health: Health,
    /// Lease held.
    pub leased: bool,
    /// Job dispatched.
    pub busy: bool,
    /// Registration time in milliseconds since epoch.
    pub registered_at_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_seeds_known_fields_in_order() {
        let d = Descriptor::new("B1", "evb", "host-a", "10.0.0.1");
        let keys: Vec<&str> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, KNOWN_FIELDS);
        assert_eq!(d.board_id(), "B1");
        assert_eq!(d.endpoint(), "10.0.0.1");
        assert_eq!(d.get("chip_name"), Some(""));
    }

    #[test]
    fn test_descriptor_extra_fields_append() {
        let d = Descriptor::new("B1", "evb", "host-a", "10.0.0.1")
            .with("chip_name", "pxa1908")
            .with("rack", "R7");
        assert_eq!(d.get("chip_name"), Some("pxa1908"));
        let extras: Vec<_> = d.extra_fields().collect();
        assert_eq!(extras, vec![("rack", "R7")]);
    }

    #[test]
    fn test_lease_refused_when_busy() {
        let dev = Device::new(1, Descriptor::new("B1", "evb", "h", "e"));
        dev.set_busy(true);
        assert!(!dev.try_lease());
        dev.set_busy(false);
        assert!(dev.try_lease());
        // Second lease attempt loses the CAS.
        assert!(!dev.try_lease());
    }

    #[test]
    fn test_streak_accumulates_until_online() {
        let dev = Device::new(1, Descriptor::new("B1", "evb", "h", "e"));
        dev.record_probe(true, "query fail".into());
        assert_eq!(dev.accumulate_streak(5), 5);
        assert_eq!(dev.accumulate_streak(5), 10);
        dev.record_probe(true, "Board Online".into());
        assert_eq!(dev.accumulate_streak(5), 0);
    }

    #[test]
    fn test_update_descriptor_keeps_board_id() {
        let dev = Device::new(1, Descriptor::new("B1", "evb", "h", "e"));
        dev.record_probe(false, OFFLINE_STATUS.into());
        dev.accumulate_streak(30);
        dev.update_descriptor(Descriptor::new("other", "evb2", "h2", "e2"));
        assert_eq!(dev.descriptor().board_id(), "B1");
        assert_eq!(dev.descriptor().get("board_type"), Some("evb2"));
        assert_eq!(dev.health().unhealthy_streak_secs, 0);
    }
}

//! Pool snapshot file: a big-endian, length-prefixed record format.
//!
//! Layout: `u32` format tag, pool name, pool description, `u32` record
//! count, then per record `board_id`, `board_type`, `machine`, `endpoint`,
//! the numeric id as a decimal string, the remaining [`KNOWN_FIELDS`] in
//! order, and a `u32` count of extra key/value pairs. Every string is a
//! `u32` byte length followed by UTF-8 bytes.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::device::{Descriptor, KNOWN_FIELDS};
use crate::core::SchedulerError;
use crate::util::serde::DeviceId;

/// Format tag written at the head of every snapshot.
pub const FORMAT_VERSION: u32 = 1;

/// File extension for snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "rpl";

/// One persisted device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Registry id.
    pub id: DeviceId,
    /// Static attributes.
    pub descriptor: Descriptor,
}

/// Persisted pool membership. Ownership is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Pool name.
    pub name: String,
    /// Pool description.
    pub description: String,
    /// Devices in slot order.
    pub records: Vec<SnapshotRecord>,
}

/// Path of the snapshot for `pool` inside `dir`.
pub fn snapshot_path(dir: &Path, pool: &str) -> PathBuf {
    dir.join(format!("{pool}.{SNAPSHOT_EXTENSION}"))
}

impl PoolSnapshot {
    /// Serialize to bytes.
    pub fn encode(&self) -> Result<Bytes, SchedulerError> {
        let mut buf = BytesMut::with_capacity(256 + self.records.len() * 256);
        buf.put_u32(FORMAT_VERSION);
        put_str(&mut buf, &self.name)?;
        put_str(&mut buf, &self.description)?;
        buf.put_u32(len_u32(self.records.len())?);
        for record in &self.records {
            let d = &record.descriptor;
            for key in &KNOWN_FIELDS[..4] {
                put_str(&mut buf, d.get(key).unwrap_or_default())?;
            }
            put_str(&mut buf, &record.id.to_string())?;
            for key in &KNOWN_FIELDS[4..] {
                put_str(&mut buf, d.get(key).unwrap_or_default())?;
            }
            let extras: Vec<(&str, &str)> = d.extra_fields().collect();
            buf.put_u32(len_u32(extras.len())?);
            for (k, v) in extras {
                put_str(&mut buf, k)?;
                put_str(&mut buf, v)?;
            }
        }
        Ok(buf.freeze())
    }

    /// Parse bytes produced by [`PoolSnapshot::encode`].
    pub fn decode(mut input: &[u8]) -> Result<Self, SchedulerError> {
        let buf = &mut input;
        let version = get_u32(buf, "format tag")?;
        if version != FORMAT_VERSION {
            return Err(SchedulerError::Snapshot(format!(
                "unrecognized format tag {version}"
            )));
        }
        let name = get_str(buf, "pool name")?;
        let description = get_str(buf, "pool description")?;
        let count = get_u32(buf, "record count")?;

        let mut records = Vec::new();
        for n in 0..count {
            let board_id = get_str(buf, "board_id")?;
            let board_type = get_str(buf, "board_type")?;
            let machine = get_str(buf, "machine")?;
            let endpoint = get_str(buf, "endpoint")?;
            let id_text = get_str(buf, "id")?;
            let id = id_text.parse::<DeviceId>().map_err(|e| {
                SchedulerError::Snapshot(format!("record {n}: bad id `{id_text}`: {e}"))
            })?;
            let mut descriptor = Descriptor::new(board_id, board_type, machine, endpoint);
            for key in &KNOWN_FIELDS[4..] {
                descriptor.set(*key, get_str(buf, key)?);
            }
            let extras = get_u32(buf, "extra field count")?;
            for _ in 0..extras {
                let key = get_str(buf, "extra key")?;
                let value = get_str(buf, "extra value")?;
                descriptor.set(key, value);
            }
            records.push(SnapshotRecord { id, descriptor });
        }
        if buf.has_remaining() {
            return Err(SchedulerError::Snapshot(format!(
                "{} trailing bytes after {count} records",
                buf.remaining()
            )));
        }
        Ok(Self {
            name,
            description,
            records,
        })
    }

    /// Write atomically (temp file then rename).
    pub fn write_to(&self, path: &Path) -> Result<(), SchedulerError> {
        let bytes = self.encode()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension(format!("{SNAPSHOT_EXTENSION}.tmp"));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read a snapshot. A missing or empty file yields `None`.
    pub fn read_from(path: &Path) -> Result<Option<Self>, SchedulerError> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Self::decode(&bytes).map(Some)
    }
}

fn len_u32(len: usize) -> Result<u32, SchedulerError> {
    u32::try_from(len).map_err(|_| SchedulerError::Snapshot(format!("length {len} exceeds u32")))
}

fn put_str(buf: &mut BytesMut, s: &str) -> Result<(), SchedulerError> {
    buf.put_u32(len_u32(s.len())?);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn get_u32(buf: &mut &[u8], what: &str) -> Result<u32, SchedulerError> {
    if buf.remaining() < 4 {
        return Err(SchedulerError::Snapshot(format!("truncated {what}")));
    }
    Ok(buf.get_u32())
}

fn get_str(buf: &mut &[u8], what: &str) -> Result<String, SchedulerError> {
    let len = get_u32(buf, what)? as usize;
    if buf.remaining() < len {
        return Err(SchedulerError::Snapshot(format!("truncated {what}")));
    }
    let value = String::from_utf8(buf[..len].to_vec())
        .map_err(|e| SchedulerError::Snapshot(format!("{what} is not UTF-8: {e}")))?;
    buf.advance(len);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PoolSnapshot {
        PoolSnapshot {
            name: "cloudtest".into(),
            description: "record all the registered board_id".into(),
            records: vec![
                SnapshotRecord {
                    id: 3,
                    descriptor: Descriptor::new("B1", "evb", "host-a", "10.0.0.1")
                        .with("chip_name", "pxa1908")
                        .with("rack", "R7"),
                },
                SnapshotRecord {
                    id: 9,
                    descriptor: Descriptor::new("B2", "dkb", "host-b", "10.0.0.2"),
                },
            ],
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 9]);
        assert_eq!(&bytes[8..17], b"cloudtest");
    }

    #[test]
    fn test_decode_restores_extras_and_ids() {
        let decoded = PoolSnapshot::decode(&sample().encode().unwrap()).unwrap();
        assert_eq!(decoded, sample());
        assert_eq!(decoded.records[0].descriptor.get("rack"), Some("R7"));
    }

    #[test]
    fn test_unknown_format_tag() {
        let mut bytes = sample().encode().unwrap().to_vec();
        bytes[3] = 7;
        let err = PoolSnapshot::decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("format tag"));
    }

    #[test]
    fn test_count_mismatch_detected() {
        let good = sample().encode().unwrap().to_vec();

        // Truncated: last record incomplete.
        assert!(PoolSnapshot::decode(&good[..good.len() - 3]).is_err());

        // Trailing data: an extra byte after the declared records.
        let mut long = good.clone();
        long.push(0);
        assert!(PoolSnapshot::decode(&long).is_err());
    }
}

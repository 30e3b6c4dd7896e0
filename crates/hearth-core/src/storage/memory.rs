use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::series::Window;

use super::{DeviceId, Record, SampleSource};

/// Serialized form of a [`MemoryStore`]
#[derive(Serialize, Deserialize)]
struct Snapshot {
    devices: Vec<(DeviceId, Vec<Record>)>,
}

/// In-memory history keyed by device
///
/// Rows for each device are kept sorted by timestamp, with at most one row
/// per timestamp.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: BTreeMap<DeviceId, Vec<Record>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row for `device`
    ///
    /// Rows may arrive out of order; they are placed by timestamp. Fails
    /// with [`Error::DuplicateTimestamp`] if the device already has a row at
    /// that instant.
    pub fn insert(&mut self, device: DeviceId, record: Record) -> Result<()> {
        let rows = self.rows.entry(device).or_default();

        match rows.binary_search_by_key(&record.timestamp, |row| row.timestamp) {
            Ok(_) => Err(Error::DuplicateTimestamp {
                device,
                timestamp: record.timestamp,
            }),
            Err(index) => {
                rows.insert(index, record);
                Ok(())
            }
        }
    }

    /// Drop rows of `device` older than `cutoff`, returning how many went
    pub fn remove_before(&mut self, device: DeviceId, cutoff: i64) -> usize {
        let Some(rows) = self.rows.get_mut(&device) else {
            return 0;
        };

        let keep_from = rows.partition_point(|row| row.timestamp < cutoff);
        rows.drain(..keep_from);
        debug!("Trimmed {} rows of device {} before {}", keep_from, device, cutoff);
        keep_from
    }

    /// Devices with at least one row ever inserted
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.rows.keys().copied()
    }

    /// Number of rows stored for `device`
    pub fn len(&self, device: DeviceId) -> usize {
        self.rows.get(&device).map_or(0, Vec::len)
    }

    /// Newest row of `device`
    pub fn latest(&self, device: DeviceId) -> Option<&Record> {
        self.rows.get(&device).and_then(|rows| rows.last())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(Vec::is_empty)
    }

    /// Encode every row into a postcard snapshot
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = Snapshot {
            devices: self
                .rows
                .iter()
                .map(|(device, rows)| (*device, rows.clone()))
                .collect(),
        };
        Ok(postcard::to_allocvec(&snapshot)?)
    }

    /// Rebuild a store from a snapshot produced by [`to_bytes`](Self::to_bytes)
    ///
    /// Rows go through [`insert`](Self::insert) again, so a snapshot with
    /// duplicate timestamps is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = postcard::from_bytes(bytes)?;
        let mut store = Self::new();
        let mut count = 0usize;

        for (device, rows) in snapshot.devices {
            for record in rows {
                store.insert(device, record)?;
                count += 1;
            }
        }

        info!("Loaded {} rows for {} devices", count, store.rows.len());
        Ok(store)
    }
}

impl SampleSource for MemoryStore {
    fn records_in_window(&self, device: DeviceId, window: Window) -> Result<Vec<Record>> {
        let Some(rows) = self.rows.get(&device) else {
            return Ok(Vec::new());
        };

        let first_inside = rows.partition_point(|row| row.timestamp < window.min());
        let first_after = rows.partition_point(|row| row.timestamp <= window.max());
        let start = first_inside.saturating_sub(1);
        let end = (first_after + 1).min(rows.len());

        Ok(rows[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;

    const SWITCH: DeviceId = DeviceId(7);

    fn store_with(points: &[(i64, f64)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for &(ts, value) in points {
            store.insert(SWITCH, Record::new(ts, value)).unwrap();
        }
        store
    }

    #[test]
    fn test_insert_keeps_rows_ordered() {
        let store = store_with(&[(30, 3.0), (10, 1.0), (20, 2.0)]);
        let rows = store
            .records_in_window(SWITCH, Window::new(0, 100).unwrap())
            .unwrap();
        let stamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, [10, 20, 30]);
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let mut store = store_with(&[(10, 1.0)]);
        let err = store.insert(SWITCH, Record::new(10, 2.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateTimestamp {
                device: SWITCH,
                timestamp: 10
            }
        ));
        assert_eq!(store.len(SWITCH), 1);
    }

    #[test]
    fn test_window_includes_seed_and_lookahead_rows() {
        let store = store_with(&[(1, 1.0), (5, 2.0), (10, 3.0), (15, 4.0), (21, 5.0), (30, 6.0)]);
        let samples = store
            .samples_in_window(SWITCH, Window::new(8, 20).unwrap())
            .unwrap();
        assert_eq!(
            samples,
            [
                Sample::new(5, 2.0),
                Sample::new(10, 3.0),
                Sample::new(15, 4.0),
                Sample::new(21, 5.0)
            ]
        );
    }

    #[test]
    fn test_window_starting_on_a_row_still_seeds() {
        let store = store_with(&[(1, 1.0), (8, 2.0)]);
        let rows = store
            .records_in_window(SWITCH, Window::new(8, 8).unwrap())
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, 1);
    }

    #[test]
    fn test_unknown_device_is_empty() {
        let store = store_with(&[(1, 1.0)]);
        let rows = store
            .records_in_window(DeviceId(99), Window::new(0, 10).unwrap())
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_remove_before() {
        let mut store = store_with(&[(1, 1.0), (5, 2.0), (10, 3.0)]);
        assert_eq!(store.remove_before(SWITCH, 6), 2);
        assert_eq!(store.len(SWITCH), 1);
        assert_eq!(store.remove_before(DeviceId(99), 6), 0);
    }

    #[test]
    fn test_latest() {
        let store = store_with(&[(5, 2.0), (1, 1.0)]);
        assert_eq!(store.latest(SWITCH), Some(&Record::new(5, 2.0)));
        assert_eq!(store.latest(DeviceId(99)), None);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = store_with(&[(1, 0.0), (9, 100.0)]);
        store
            .insert(DeviceId(2), Record::new(4, 21.5).with_label("21.5 °C"))
            .unwrap();

        let bytes = store.to_bytes().unwrap();
        let restored = MemoryStore::from_bytes(&bytes).unwrap();

        assert_eq!(restored.devices().collect::<Vec<_>>(), [DeviceId(2), SWITCH]);
        let rows = restored
            .records_in_window(DeviceId(2), Window::new(0, 10).unwrap())
            .unwrap();
        assert_eq!(rows, [Record::new(4, 21.5).with_label("21.5 °C")]);
    }

    #[test]
    fn test_garbage_snapshot_is_an_encoding_error() {
        let err = MemoryStore::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}

//! Device history rows and the storage seam
//!
//! The aggregation engine never talks to a database. It consumes ordered
//! [`Sample`]s that a [`SampleSource`] hands out for a device and window.
//! [`MemoryStore`] is the reference source used by the simulator and tests;
//! a durable engine implements the same trait.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::{Sample, Window};

mod memory;

pub use memory::MemoryStore;

/// Reference to a device (or a device feature) whose values are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u32);

impl Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One recorded observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Seconds since epoch
    pub timestamp: i64,
    /// Numeric device value
    pub value: f64,
    /// Display string the device reported for this value, if any
    ///
    /// Example: a switch at `100.0` may report `"On"`.
    pub label: Option<String>,
}

impl Display for Record {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.label {
            Some(label) => write!(
                f,
                "[Record] t: {}, value: {} ({})",
                self.timestamp, self.value, label
            ),
            None => write!(f, "[Record] t: {}, value: {}", self.timestamp, self.value),
        }
    }
}

impl Record {
    /// Create an unlabelled record
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value,
            label: None,
        }
    }

    /// Attach a display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Project onto the `(timestamp, value)` step the engine works with
    pub const fn sample(&self) -> Sample {
        Sample::new(self.timestamp, self.value)
    }
}

/// Storage collaborator the history layer reads from
pub trait SampleSource {
    /// Rows of `device` with `window.min <= timestamp <= window.max`
    ///
    /// Sorted ascending by timestamp, preceded by at most one seed row (the
    /// latest row strictly before `window.min`, so the value active at the
    /// window start is known) and followed by at most one lookahead row (the
    /// earliest row strictly after `window.max`, so linear fill knows where
    /// the last in-window step is heading).
    fn records_in_window(&self, device: DeviceId, window: Window) -> Result<Vec<Record>>;

    /// Same rows as [`records_in_window`](Self::records_in_window), as samples
    fn samples_in_window(&self, device: DeviceId, window: Window) -> Result<Vec<Sample>> {
        Ok(self
            .records_in_window(device, window)?
            .iter()
            .map(Record::sample)
            .collect())
    }
}

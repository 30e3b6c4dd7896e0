//! Step-series aggregation engine
//!
//! Device history is a step function: every [`Sample`] holds its value from
//! its own timestamp until the next sample's timestamp (or until the end of
//! the query window). The functions in this module answer questions about
//! that step function over a [`Window`]:
//!
//! - [`resample`]: fixed-width buckets, one time-weighted value per bucket
//! - [`average`]: a single time-weighted value for the whole window
//! - [`histogram`]: total time spent at each distinct value
//! - [`slope`]: least-squares trend of the raw in-window points
//!
//! All of them are pure functions over an ordered sample sequence. Callers
//! fetch that sequence from storage first (usually with one seed sample just
//! before `window.min`, so the value active at the window start is known).
//!
//! # Window bounds
//!
//! `window.max` is *inclusive*: a window `[1, 30]` covers thirty one-second
//! instants. All bucket arithmetic works on `max + 1`, see
//! [`Window::end_exclusive`].
//!
//! # Examples
//!
//! ```
//! use hearth_core::series::{FillStrategy, Sample, Window, resample};
//!
//! let samples = [Sample::new(1, 100.0), Sample::new(11, 200.0), Sample::new(21, 300.0)];
//! let window = Window::new(1, 30)?;
//! let buckets = resample(window, 10, FillStrategy::PreviousValue, samples)?;
//!
//! assert_eq!(buckets, [(1, 100.0), (11, 200.0), (21, 300.0)]);
//! # Ok::<(), hearth_core::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod cursor;
mod histogram;
mod regression;
mod resample;
mod wide_sum;

pub use cursor::SeriesCursor;
pub use histogram::{Histogram, histogram};
pub use regression::{RegressionSums, regression, slope};
pub use resample::{average, resample};
pub use wide_sum::WideSum;

/// A step change in a device's value
///
/// The value holds from `timestamp` until the next sample in the sequence
/// (or the series end boundary when it is the last one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since epoch (already localized by the caller)
    pub timestamp: i64,
    /// Value in device units
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(i64, f64)> for Sample {
    fn from((timestamp, value): (i64, f64)) -> Self {
        Self { timestamp, value }
    }
}

/// Query window with an inclusive upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct Window {
    min: i64,
    max: i64,
}

impl Window {
    /// Create a window covering `[min, max]`
    ///
    /// Fails with [`Error::InvalidWindow`] when `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// First instant covered by the window
    pub const fn min(&self) -> i64 {
        self.min
    }

    /// Last instant covered by the window (inclusive)
    pub const fn max(&self) -> i64 {
        self.max
    }

    /// Exclusive end used by all bucket arithmetic (`max + 1`)
    ///
    /// Saturates at `i64::MAX`, which drops the final instant of a window
    /// that ends at the very last representable second.
    pub const fn end_exclusive(&self) -> i64 {
        self.max.saturating_add(1)
    }

    /// Number of one-second instants covered, `end_exclusive() - min`
    ///
    /// Unsigned so the widest windows (`[i64::MIN, ..]`) are exact.
    pub const fn width(&self) -> u64 {
        self.end_exclusive().abs_diff(self.min)
    }

    /// Whether `timestamp` lies inside `[min, max]`
    pub const fn contains(&self, timestamp: i64) -> bool {
        self.min <= timestamp && timestamp <= self.max
    }
}

impl TryFrom<(i64, i64)> for Window {
    type Error = Error;

    fn try_from((min, max): (i64, i64)) -> Result<Self> {
        Self::new(min, max)
    }
}

impl From<Window> for (i64, i64) {
    fn from(window: Window) -> Self {
        (window.min, window.max)
    }
}

/// How a sample's value is spread across the time until the next sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillStrategy {
    /// Hold the last observed value until the next sample (step/LOCF)
    #[default]
    PreviousValue,
    /// Interpolate linearly between consecutive samples
    Linear,
}

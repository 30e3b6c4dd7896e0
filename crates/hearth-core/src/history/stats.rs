//! Summary statistics for a device over a window

use serde::{Deserialize, Serialize};

use crate::series::Histogram;

/// Statistics for a time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Time-weighted average, `None` when nothing covered the window
    pub average: Option<f64>,
    /// Lowest value active at any point in the window
    pub min: Option<f64>,
    /// Highest value active at any point in the window
    pub max: Option<f64>,
    /// Least-squares trend in value units per second
    pub slope: f64,
    /// Number of distinct values active in the window
    pub distinct_values: usize,
    /// Number of records stamped inside the window
    pub record_count: usize,
}

impl Statistics {
    /// Slope scaled to value units per hour, the unit trend displays use
    pub fn slope_per_hour(&self) -> f64 {
        self.slope * 3600.0
    }

    /// `max - min`, if any value was active
    pub fn range(&self) -> Option<f64> {
        Some(self.max? - self.min?)
    }
}

/// Extremes of the values present in a histogram
pub(super) fn value_extremes(histogram: &Histogram) -> (Option<f64>, Option<f64>) {
    histogram
        .iter()
        .fold((None, None), |(min, max), (value, _)| {
            (
                Some(min.map_or(value, |m: f64| m.min(value))),
                Some(max.map_or(value, |m: f64| m.max(value))),
            )
        })
}

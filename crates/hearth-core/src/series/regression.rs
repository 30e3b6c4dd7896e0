use log::trace;

use super::{Sample, WideSum, Window};

/// Running least-squares sums for value against time
///
/// Time offsets are whole seconds, so their sums are kept exactly as
/// integers. Value sums use [`WideSum`]. Callers feed points already
/// shifted so that the first point sits at the origin; both the slope and
/// the coefficient of determination are invariant under that shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionSums {
    count: u64,
    sum_x: i128,
    sum_x_squared: i128,
    sum_y: WideSum,
    sum_y_squared: WideSum,
    sum_xy: WideSum,
}

impl RegressionSums {
    /// Add a point `(x seconds, y)`
    pub fn add(&mut self, x: i128, y: f64) {
        let x_f64 = x as f64;

        self.count += 1;
        self.sum_x = self.sum_x.saturating_add(x);
        self.sum_x_squared = self.sum_x_squared.saturating_add(x.saturating_mul(x));
        self.sum_y += y;
        self.sum_y_squared.add_product(y, y);
        self.sum_xy.add_product(x_f64, y);
    }

    /// Number of points added
    pub fn count(&self) -> u64 {
        self.count
    }

    /// `n·Σx² − (Σx)²`, zero when every x is identical
    fn x_spread(&self) -> i128 {
        let n = self.count as i128;
        n.saturating_mul(self.sum_x_squared)
            .saturating_sub(self.sum_x.saturating_mul(self.sum_x))
    }

    /// `n·Σxy − Σx·Σy`
    fn covariance_term(&self) -> WideSum {
        self.sum_xy * self.count as f64 - self.sum_y * WideSum::from_i128(self.sum_x)
    }

    /// Least-squares slope in value units per second
    ///
    /// `0` for fewer than two points or when all points share one instant.
    pub fn slope(&self) -> f64 {
        if self.count <= 1 {
            return 0.0;
        }

        let spread = self.x_spread();
        if spread == 0 {
            return 0.0;
        }

        self.covariance_term().value() / spread as f64
    }

    /// Coefficient of determination (r²) of the fit
    ///
    /// `None` when the fit is undefined (fewer than two points, or no
    /// spread in either time or value).
    pub fn r_squared(&self) -> Option<f64> {
        if self.count <= 1 {
            return None;
        }

        let x_spread = self.x_spread();
        let y_spread = self.sum_y_squared * self.count as f64 - self.sum_y * self.sum_y;
        if x_spread == 0 || y_spread.value() <= 0.0 {
            return None;
        }

        let covariance = self.covariance_term();
        let explained = covariance * covariance;
        Some(explained.value() / (WideSum::from_i128(x_spread) * y_spread).value())
    }
}

/// Least-squares slope of the raw sample points inside `window`
///
/// Only samples with `window.min <= timestamp <= window.max` take part;
/// seed samples before the window and anything after it are skipped. Time
/// is measured from the first in-window sample. Returns `0` for fewer than
/// two points and for a degenerate fit (all points at one instant).
pub fn slope<S>(window: Window, samples: S) -> f64
where
    S: IntoIterator<Item = Sample>,
{
    regression(window, samples).slope()
}

/// Accumulate [`RegressionSums`] over the in-window samples
pub fn regression<S>(window: Window, samples: S) -> RegressionSums
where
    S: IntoIterator<Item = Sample>,
{
    let mut sums = RegressionSums::default();
    let mut origin: Option<Sample> = None;

    for sample in samples
        .into_iter()
        .filter(|sample| window.contains(sample.timestamp))
    {
        let origin = *origin.get_or_insert(sample);
        let x = i128::from(sample.timestamp) - i128::from(origin.timestamp);
        sums.add(x, sample.value - origin.value);
    }

    trace!(
        "Regression over [{}, {}]: {} points",
        window.min(),
        window.max(),
        sums.count()
    );

    sums
}

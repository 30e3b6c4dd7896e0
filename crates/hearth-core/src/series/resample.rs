use alloc::vec::Vec;
use log::debug;

use crate::error::{Error, Result};

use super::{FillStrategy, Sample, SeriesCursor, Window};

/// Running time-weighted sum for one bucket
///
/// Lives for a single iteration of the bucket loop.
#[derive(Debug, Default)]
struct BucketAccumulator {
    weighted_sum: f64,
    covered_secs: u64,
}

impl BucketAccumulator {
    /// Add `area` (value × seconds) covering `duration` seconds
    fn add(&mut self, area: f64, duration: u64) {
        self.weighted_sum += area;
        self.covered_secs = self.covered_secs.saturating_add(duration);
    }

    /// Weighted mean, or `None` when nothing covered the bucket
    fn value(&self) -> Option<f64> {
        (self.covered_secs > 0).then(|| self.weighted_sum / self.covered_secs as f64)
    }
}

/// Area under the step (or line) of `current` over `[from, to]`
///
/// With a `next` sample the value is interpolated from `current.value` at
/// `current.timestamp` to `next.value` at `next.timestamp`, and the area is
/// the trapezoid over the sub-interval. Without one it is a flat rectangle.
/// Offsets are taken in `i128` so samples at opposite ends of the timeline
/// do not overflow.
fn contribution(current: Sample, next: Option<Sample>, from: i64, to: i64) -> f64 {
    let duration = (i128::from(to) - i128::from(from)) as f64;

    match next {
        Some(next) if next.timestamp != current.timestamp => {
            let t1 = i128::from(current.timestamp);
            let span = (i128::from(next.timestamp) - t1) as f64;
            let offsets = ((i128::from(from) - t1) + (i128::from(to) - t1)) as f64;
            let mid_value = (next.value - current.value) * offsets / (2.0 * span) + current.value;
            mid_value * duration
        }
        _ => current.value * duration,
    }
}

/// Resample a step series into fixed-width buckets
///
/// Buckets start at `window.min()` and step by `interval_secs` up to
/// `window.max() + 1` (exclusive). Each bucket's value is the time-weighted
/// average of the series over the part of the bucket it covers. Buckets
/// that no sample covers are omitted rather than zero-filled, so a chart
/// shows a gap where there is no data. Reported timestamps are the left edge
/// of each bucket.
///
/// # Errors
///
/// [`Error::InvalidInterval`] when `interval_secs <= 0`.
pub fn resample<S>(
    window: Window,
    interval_secs: i64,
    fill: FillStrategy,
    samples: S,
) -> Result<Vec<(i64, f64)>>
where
    S: IntoIterator<Item = Sample>,
{
    if interval_secs <= 0 {
        return Err(Error::InvalidInterval { interval_secs });
    }

    Ok(bucketize(window, interval_secs.unsigned_abs(), fill, samples))
}

/// Time-weighted average of the series over the whole window
///
/// Equivalent to [`resample`] with a single bucket as wide as the window.
/// Returns `None` when no sample covers any part of the window.
pub fn average<S>(window: Window, fill: FillStrategy, samples: S) -> Option<f64>
where
    S: IntoIterator<Item = Sample>,
{
    // Zero only for a window pinned at i64::MAX, which has no bucket anyway
    let buckets = bucketize(window, window.width().max(1), fill, samples);
    debug_assert!(
        buckets.len() <= 1,
        "window-wide resample produced {} buckets",
        buckets.len()
    );
    buckets.first().map(|&(_, value)| value)
}

/// Bucket loop shared by [`resample`] and [`average`]
///
/// `interval_secs` is unsigned so a single bucket can span the widest
/// window.
fn bucketize<S>(
    window: Window,
    interval_secs: u64,
    fill: FillStrategy,
    samples: S,
) -> Vec<(i64, f64)>
where
    S: IntoIterator<Item = Sample>,
{
    let series_end = window.end_exclusive();
    let mut cursor = SeriesCursor::new(samples, series_end);
    let mut buckets = Vec::new();
    let mut bucket_start = window.min();

    while bucket_start < series_end {
        let bucket_end = bucket_start.saturating_add_unsigned(interval_secs);
        let limit = bucket_end.min(series_end);
        let mut bucket = BucketAccumulator::default();

        while let Ok(current) = cursor.current() {
            // Sample starts in a later bucket: leave it for that bucket
            if current.timestamp >= limit {
                break;
            }

            let Ok(finish) = cursor.finish_of_current_step() else {
                break;
            };
            let from = bucket_start.max(current.timestamp);
            let to = finish.min(bucket_end);

            // Zero-length steps carry no weight and must not mark the bucket as touched
            if to > from {
                let next = match fill {
                    FillStrategy::Linear => cursor.next().ok(),
                    FillStrategy::PreviousValue => None,
                };
                bucket.add(contribution(current, next, from, to), to.abs_diff(from));
            }

            if finish < bucket_end {
                cursor.advance();
            } else {
                // Still covers part of the next bucket
                break;
            }
        }

        if let Some(value) = bucket.value() {
            buckets.push((bucket_start, value));
        }

        match bucket_start.checked_add_unsigned(interval_secs) {
            Some(start) => bucket_start = start,
            None => break,
        }
    }

    debug!(
        "Resampled [{}, {}] every {}s ({:?}) into {} buckets",
        window.min(),
        window.max(),
        interval_secs,
        fill,
        buckets.len()
    );

    buckets
}

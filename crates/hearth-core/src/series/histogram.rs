use alloc::vec::Vec;
use log::warn;
use serde::{Deserialize, Serialize};

use super::{Sample, SeriesCursor, Window};

/// Total time spent at each distinct value
///
/// Entries keep the order in which values were first seen. Values are
/// matched by exact float equality; histograms are meant for discrete device
/// states (on/off codes, quantized readings), not continuously varying data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    entries: Vec<(f64, u64)>,
}

impl Histogram {
    /// Create an empty histogram
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add `duration_secs` to the entry for `value`
    pub fn add(&mut self, value: f64, duration_secs: u64) {
        match self.entries.iter_mut().find(|(v, _)| *v == value) {
            Some((_, total)) => *total = total.saturating_add(duration_secs),
            None => self.entries.push((value, duration_secs)),
        }
    }

    /// Seconds spent at `value`, if it was seen at all
    pub fn duration_of(&self, value: f64) -> Option<u64> {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|&(_, total)| total)
    }

    /// Sum of all durations
    pub fn total_duration(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |sum, &(_, total)| sum.saturating_add(total))
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no value was active anywhere in the window
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(value, seconds)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Consume into the `(value, seconds)` pairs
    pub fn into_entries(self) -> Vec<(f64, u64)> {
        self.entries
    }
}

/// Build a value-duration histogram of the series over `window`
///
/// Each sample contributes the part of its active interval that falls
/// inside `[window.min, window.max + 1)`. Seed samples whose step ends
/// before the window starts contribute nothing.
pub fn histogram<S>(window: Window, samples: S) -> Histogram
where
    S: IntoIterator<Item = Sample>,
{
    let series_end = window.end_exclusive();
    let mut cursor = SeriesCursor::new(samples, series_end);
    let mut histogram = Histogram::new();

    while let Ok(current) = cursor.current() {
        if current.timestamp >= series_end {
            break;
        }

        let Ok(finish) = cursor.finish_of_current_step() else {
            break;
        };

        // Superseded seed: a later pre-window sample took over before min
        if finish <= window.min() {
            cursor.advance();
            continue;
        }

        let from = window.min().max(current.timestamp);
        debug_assert!(
            finish >= from,
            "negative step duration at t={} (step ends at {})",
            current.timestamp,
            finish
        );

        if finish > from {
            histogram.add(current.value, finish.abs_diff(from));
        } else if finish < from {
            warn!(
                "Ignoring negative step duration at t={} (step ends at {}, unordered samples?)",
                current.timestamp, finish
            );
        }

        cursor.advance();
    }

    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(i64, f64)]) -> Vec<Sample> {
        points.iter().copied().map(Sample::from).collect()
    }

    #[test]
    fn test_durations_cover_window() {
        let input = samples(&[(0, 1.0), (10, 0.0), (25, 1.0)]);
        let window = Window::new(0, 29).unwrap();
        let hist = histogram(window, input);

        assert_eq!(hist.len(), 2);
        assert_eq!(hist.duration_of(1.0), Some(15));
        assert_eq!(hist.duration_of(0.0), Some(15));
        assert_eq!(hist.total_duration(), window.width());
    }

    #[test]
    fn test_widest_window_duration_is_exact() {
        let input = samples(&[(i64::MIN, 1.0), (0, 2.0)]);
        let window = Window::new(i64::MIN, 9).unwrap();
        let hist = histogram(window, input);

        assert_eq!(hist.duration_of(1.0), Some(1u64 << 63));
        assert_eq!(hist.duration_of(2.0), Some(10));
        assert_eq!(hist.total_duration(), window.width());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "negative step duration")]
    fn test_unordered_samples_fail_fast() {
        let input = samples(&[(5, 1.0), (2, 2.0)]);
        histogram(Window::new(0, 9).unwrap(), input);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_unordered_samples_skip_backwards_step() {
        let input = samples(&[(5, 1.0), (2, 2.0)]);
        let hist = histogram(Window::new(0, 9).unwrap(), input);
        assert_eq!(hist.duration_of(1.0), None);
        assert_eq!(hist.duration_of(2.0), Some(8));
    }

    #[test]
    fn test_first_seen_order() {
        let input = samples(&[(0, 3.0), (5, 1.0), (6, 3.0), (8, 2.0)]);
        let hist = histogram(Window::new(0, 9).unwrap(), input);
        let entries: Vec<_> = hist.iter().collect();
        assert_eq!(entries, [(3.0, 7), (1.0, 1), (2.0, 2)]);
    }

    #[test]
    fn test_seed_clipped_to_window_start() {
        let input = samples(&[(-100, 5.0), (20, 6.0)]);
        let hist = histogram(Window::new(10, 29).unwrap(), input);
        assert_eq!(hist.duration_of(5.0), Some(10));
        assert_eq!(hist.duration_of(6.0), Some(10));
    }

    #[test]
    fn test_superseded_seed_skipped() {
        let input = samples(&[(-100, 5.0), (-10, 6.0), (5, 7.0)]);
        let hist = histogram(Window::new(0, 9).unwrap(), input);
        assert_eq!(hist.duration_of(5.0), None);
        assert_eq!(hist.duration_of(6.0), Some(5));
        assert_eq!(hist.duration_of(7.0), Some(5));
    }

    #[test]
    fn test_samples_after_window_ignored() {
        let input = samples(&[(0, 1.0), (10, 2.0), (11, 3.0)]);
        let hist = histogram(Window::new(0, 9).unwrap(), input);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.duration_of(1.0), Some(10));
    }

    #[test]
    fn test_leading_gap_not_counted() {
        let input = samples(&[(5, 1.0)]);
        let hist = histogram(Window::new(0, 9).unwrap(), input);
        assert_eq!(hist.total_duration(), 5);
    }

    #[test]
    fn test_empty_series() {
        let hist = histogram(Window::new(0, 9).unwrap(), Vec::new());
        assert!(hist.is_empty());
        assert_eq!(hist.total_duration(), 0);
    }
}

//! History queries over a [`SampleSource`]
//!
//! [`HistoryService`] is what a request-handling layer talks to. It fetches
//! rows from the storage collaborator and hands them to the aggregation
//! engine in [`crate::series`]:
//!
//! - record listings, sorted and paged
//! - graph series (fixed interval or a named [`GraphRange`])
//! - value-duration histograms
//! - a [`Statistics`] summary (average, extremes, trend, distinct values)

use alloc::vec::Vec;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::HistoryConfig;
use crate::error::{Error, Result};
use crate::series::{self, FillStrategy, Histogram, Window};
use crate::storage::{DeviceId, Record, SampleSource};

mod range;
mod stats;

pub use range::GraphRange;
pub use stats::Statistics;

/// Ordering of a record listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Oldest first
    #[default]
    TimestampAscending,
    /// Newest first
    TimestampDescending,
    /// Lowest value first, ties oldest first
    ValueAscending,
    /// Highest value first, ties oldest first
    ValueDescending,
}

/// One page of a record listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    /// Records on this page, in the requested order
    pub records: Vec<Record>,
    /// Number of records in the window before paging
    pub total: usize,
    /// Position of the first record of this page in the full listing
    pub offset: usize,
}

impl RecordPage {
    /// Whether records remain after this page
    pub fn has_more(&self) -> bool {
        self.offset + self.records.len() < self.total
    }
}

/// Typed history queries for one storage collaborator
pub struct HistoryService<S>
where
    S: SampleSource,
{
    source: S,
    config: HistoryConfig,
}

impl<S> HistoryService<S>
where
    S: SampleSource,
{
    /// Create a service with the default [`HistoryConfig`]
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: HistoryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HistoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// List the records stamped inside `window`
    ///
    /// The seed and lookahead rows around the window are not part of the
    /// listing. `limit` falls back to the configured page size.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPageSize`] for a zero limit, or any storage error.
    pub fn list_records(
        &self,
        device: DeviceId,
        window: Window,
        sort: SortOrder,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<RecordPage> {
        let limit = limit.unwrap_or(self.config.default_page_size);
        if limit == 0 {
            return Err(Error::InvalidPageSize);
        }

        let mut records: Vec<Record> = self
            .source
            .records_in_window(device, window)?
            .into_iter()
            .filter(|record| window.contains(record.timestamp))
            .collect();

        // Rows arrive oldest first and the sorts are stable, so value ties
        // stay oldest first
        match sort {
            SortOrder::TimestampAscending => {}
            SortOrder::TimestampDescending => records.reverse(),
            SortOrder::ValueAscending => records.sort_by(|a, b| a.value.total_cmp(&b.value)),
            SortOrder::ValueDescending => records.sort_by(|a, b| b.value.total_cmp(&a.value)),
        }

        let total = records.len();
        let records = records.into_iter().skip(offset).take(limit).collect();

        Ok(RecordPage {
            records,
            total,
            offset,
        })
    }

    /// Graph-ready series for `window`, one point per `interval_secs`
    ///
    /// When the window would need more than `max_graph_points` buckets the
    /// interval is widened to fit. Buckets without data are omitted.
    pub fn graph_series(
        &self,
        device: DeviceId,
        window: Window,
        interval_secs: i64,
        fill: Option<FillStrategy>,
    ) -> Result<Vec<(i64, f64)>> {
        let fill = fill.unwrap_or(self.config.default_fill);
        let interval_secs = self.capped_interval(window, interval_secs);
        let samples = self.source.samples_in_window(device, window)?;

        series::resample(window, interval_secs, fill, samples)
    }

    /// Graph series for a named range ending at `now`
    pub fn graph_range(
        &self,
        device: DeviceId,
        range: GraphRange,
        now: i64,
        fill: Option<FillStrategy>,
    ) -> Result<Vec<(i64, f64)>> {
        let window = range.window_ending_at(now)?;
        debug!("Graph {} for device {} ending at {}", range.label(), device, now);
        self.graph_series(device, window, range.interval_secs(), fill)
    }

    /// Time spent at each distinct value inside `window`
    pub fn histogram(&self, device: DeviceId, window: Window) -> Result<Histogram> {
        let samples = self.source.samples_in_window(device, window)?;
        Ok(series::histogram(window, samples))
    }

    /// Summary statistics for `window`
    pub fn statistics(
        &self,
        device: DeviceId,
        window: Window,
        fill: Option<FillStrategy>,
    ) -> Result<Statistics> {
        let fill = fill.unwrap_or(self.config.default_fill);
        let samples = self.source.samples_in_window(device, window)?;

        let histogram = series::histogram(window, samples.iter().copied());
        let (min, max) = stats::value_extremes(&histogram);

        let statistics = Statistics {
            average: series::average(window, fill, samples.iter().copied()),
            min,
            max,
            slope: series::slope(window, samples.iter().copied()),
            distinct_values: histogram.len(),
            record_count: samples
                .iter()
                .filter(|sample| window.contains(sample.timestamp))
                .count(),
        };

        info!(
            "Statistics for device {} over [{}, {}]: {:?}",
            device,
            window.min(),
            window.max(),
            statistics
        );

        Ok(statistics)
    }

    /// Widen `interval_secs` so the window fits in `max_graph_points` buckets
    ///
    /// Non-positive intervals pass through untouched so the resampler
    /// rejects them.
    fn capped_interval(&self, window: Window, interval_secs: i64) -> i64 {
        if interval_secs <= 0 {
            return interval_secs;
        }

        let max_points = u64::try_from(self.config.max_graph_points)
            .unwrap_or(u64::MAX)
            .max(1);
        let width = window.width();
        let buckets = width.div_ceil(interval_secs.unsigned_abs());
        if buckets <= max_points {
            return interval_secs;
        }

        let widened = i64::try_from(width.div_ceil(max_points)).unwrap_or(i64::MAX);
        debug!(
            "Widening graph interval from {}s to {}s ({} buckets > {})",
            interval_secs, widened, buckets, max_points
        );
        widened
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const THERMOSTAT: DeviceId = DeviceId(1);
    const LAMP: DeviceId = DeviceId(2);

    fn service() -> HistoryService<MemoryStore> {
        let mut store = MemoryStore::new();
        for (ts, value) in [(0, 20.0), (10, 22.0), (20, 21.0), (30, 25.0), (40, 19.0)] {
            store.insert(THERMOSTAT, Record::new(ts, value)).unwrap();
        }
        for (ts, value, label) in [(-5, 0.0, "Off"), (5, 100.0, "On"), (15, 0.0, "Off")] {
            store
                .insert(LAMP, Record::new(ts, value).with_label(label))
                .unwrap();
        }
        HistoryService::new(store)
    }

    fn window(min: i64, max: i64) -> Window {
        Window::new(min, max).unwrap()
    }

    fn stamps(page: &RecordPage) -> Vec<i64> {
        page.records.iter().map(|r| r.timestamp).collect()
    }

    #[test]
    fn test_listing_excludes_seed_row() {
        let page = service()
            .list_records(LAMP, window(0, 20), SortOrder::TimestampAscending, 0, None)
            .unwrap();
        assert_eq!(stamps(&page), [5, 15]);
        assert_eq!(page.total, 2);
        assert_eq!(page.records[0].label.as_deref(), Some("On"));
    }

    #[test]
    fn test_listing_sorts() {
        let svc = service();
        let w = window(0, 40);

        let newest = svc
            .list_records(THERMOSTAT, w, SortOrder::TimestampDescending, 0, None)
            .unwrap();
        assert_eq!(stamps(&newest), [40, 30, 20, 10, 0]);

        let lowest = svc
            .list_records(THERMOSTAT, w, SortOrder::ValueAscending, 0, None)
            .unwrap();
        assert_eq!(stamps(&lowest), [40, 0, 20, 10, 30]);

        let highest = svc
            .list_records(THERMOSTAT, w, SortOrder::ValueDescending, 0, None)
            .unwrap();
        assert_eq!(stamps(&highest), [30, 10, 20, 0, 40]);
    }

    #[test]
    fn test_value_ties_stay_oldest_first() {
        let svc = service();
        let page = svc
            .list_records(LAMP, window(-10, 20), SortOrder::ValueDescending, 0, None)
            .unwrap();
        assert_eq!(stamps(&page), [5, -5, 15]);
    }

    #[test]
    fn test_listing_pages() {
        let svc = service();
        let w = window(0, 40);

        let first = svc
            .list_records(THERMOSTAT, w, SortOrder::TimestampAscending, 0, Some(2))
            .unwrap();
        assert_eq!(stamps(&first), [0, 10]);
        assert!(first.has_more());

        let last = svc
            .list_records(THERMOSTAT, w, SortOrder::TimestampAscending, 4, Some(2))
            .unwrap();
        assert_eq!(stamps(&last), [40]);
        assert_eq!(last.total, 5);
        assert!(!last.has_more());

        let past_end = svc
            .list_records(THERMOSTAT, w, SortOrder::TimestampAscending, 10, Some(2))
            .unwrap();
        assert!(past_end.records.is_empty());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = service()
            .list_records(THERMOSTAT, window(0, 40), SortOrder::default(), 0, Some(0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPageSize));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_graph_series_uses_seed() {
        let points = service()
            .graph_series(LAMP, window(0, 19), 10, None)
            .unwrap();
        // [0, 5) off, [5, 10) on, [10, 15) on, [15, 20) off
        assert_eq!(points, [(0, 50.0), (10, 50.0)]);
    }

    #[test]
    fn test_graph_series_linear_fill() {
        let points = service()
            .graph_series(THERMOSTAT, window(0, 9), 5, Some(FillStrategy::Linear))
            .unwrap();
        assert_eq!(points, [(0, 20.5), (5, 21.5)]);
    }

    #[test]
    fn test_graph_interval_capped() {
        let config = HistoryConfig {
            max_graph_points: 2,
            ..HistoryConfig::default()
        };
        let svc = service().with_config(config);
        let points = svc.graph_series(THERMOSTAT, window(0, 39), 1, None).unwrap();
        // 40 one-second buckets don't fit in 2, so buckets become 20s wide
        assert_eq!(points, [(0, 21.0), (20, 23.0)]);
    }

    #[test]
    fn test_graph_with_unbounded_point_cap() {
        let config = HistoryConfig {
            max_graph_points: usize::MAX,
            ..HistoryConfig::default()
        };
        let svc = service().with_config(config);
        let points = svc.graph_series(THERMOSTAT, window(0, 39), 10, None).unwrap();
        assert_eq!(points, [(0, 20.0), (10, 22.0), (20, 21.0), (30, 25.0)]);
    }

    #[test]
    fn test_graph_cap_over_widest_window() {
        let config = HistoryConfig {
            max_graph_points: 4,
            ..HistoryConfig::default()
        };
        let svc = service().with_config(config);
        let points = svc
            .graph_series(THERMOSTAT, window(i64::MIN, i64::MAX), 1, None)
            .unwrap();
        // Buckets are 2^62 seconds wide; nothing is stored before 0
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].0, 0);
        assert_eq!(points[1], (1 << 62, 19.0));
    }

    #[test]
    fn test_graph_rejects_zero_interval() {
        let err = service()
            .graph_series(THERMOSTAT, window(0, 39), 0, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { interval_secs: 0 }));
    }

    #[test]
    fn test_graph_range() {
        let points = service()
            .graph_range(THERMOSTAT, GraphRange::OneMinute, 49, None)
            .unwrap();
        // Window [-10, 49]: no data before 0, then one point per 10s
        assert_eq!(
            points,
            [(0, 20.0), (10, 22.0), (20, 21.0), (30, 25.0), (40, 19.0)]
        );
    }

    #[test]
    fn test_histogram() {
        let histogram = service().histogram(LAMP, window(0, 19)).unwrap();
        assert_eq!(histogram.duration_of(0.0), Some(10));
        assert_eq!(histogram.duration_of(100.0), Some(10));
        assert_eq!(histogram.total_duration(), 20);
    }

    #[test]
    fn test_statistics() {
        let stats = service()
            .statistics(THERMOSTAT, window(0, 49), None)
            .unwrap();

        // 10s at each of 20, 22, 21, 25 and 19
        assert_eq!(stats.average, Some(21.4));
        assert_eq!(stats.min, Some(19.0));
        assert_eq!(stats.max, Some(25.0));
        assert_eq!(stats.distinct_values, 5);
        assert_eq!(stats.record_count, 5);
        assert!(stats.slope > 0.0);
    }

    #[test]
    fn test_statistics_include_seed_value() {
        let stats = service().statistics(LAMP, window(0, 9), None).unwrap();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(100.0));
        assert_eq!(stats.record_count, 1);
        // Only one in-window point, so no trend
        assert_eq!(stats.slope, 0.0);
        assert_eq!(stats.average, Some(50.0));
    }

    #[test]
    fn test_statistics_of_empty_device() {
        let stats = service()
            .statistics(DeviceId(42), window(0, 100), None)
            .unwrap();
        assert_eq!(stats, Statistics::default());
    }
}

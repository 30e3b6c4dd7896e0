//! Desktop simulator for the hearth history engine.
//!
//! Generates synthetic device history (a thermostat reading and a lamp
//! switch), stores it in a [`MemoryStore`] and runs every history query
//! against it, logging the results. Run with `RUST_LOG=info` (or `debug`
//! to see the engine's own logging).
//!
//! # Environment
//!
//! | Variable          | Effect                                              |
//! |-------------------|-----------------------------------------------------|
//! | `HEARTH_SNAPSHOT` | Load history from this file if it exists, save the  |
//! |                   | generated history back to it on exit                |
//! | `RUST_LOG`        | `env_logger` filter                                 |

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{error, info, warn};

use hearth_core::history::{GraphRange, HistoryService, SortOrder};
use hearth_core::series::{FillStrategy, Window};
use hearth_core::storage::{DeviceId, MemoryStore, Record};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Thermostat temperature reading, °C.
const THERMOSTAT: DeviceId = DeviceId(1);

/// Living-room lamp, `0.0` (off) or `100.0` (on).
const LAMP: DeviceId = DeviceId(2);

/// How much history to generate, ending now.
const HISTORY_SECS: i64 = 24 * 3600;

/// Environment variable naming the snapshot file.
const SNAPSHOT_ENV: &str = "HEARTH_SNAPSHOT";

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates synthetic device rows at irregular intervals.
///
/// A small xorshift generator stands in for real jitter so runs are
/// reproducible.
struct MockDeviceGenerator {
    state: u64,
}

impl MockDeviceGenerator {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform integer in `[low, high]`
    fn between(&mut self, low: i64, high: i64) -> i64 {
        let span = (high - low + 1) as u64;
        low + (self.next_u64() % span) as i64
    }

    /// Temperature rows from `start` to `end`, 20–26 °C with a daily cycle.
    ///
    /// Reports arrive every 30–300 s, like a sensor that only pushes on
    /// change.
    fn thermostat_history(&mut self, start: i64, end: i64) -> Vec<Record> {
        let mut rows = Vec::new();
        let mut ts = start;

        while ts <= end {
            let t = ts as f64;
            let celsius = 23.0 + 3.0 * (t / 13_751.0).sin() + 0.5 * (t / 1_170.0).cos();
            // Devices report with one decimal
            let celsius = (celsius * 10.0).round() / 10.0;

            rows.push(Record::new(ts, celsius).with_label(format!("{celsius:.1} °C")));
            ts += self.between(30, 300);
        }

        rows
    }

    /// Lamp rows from `start` to `end`, toggling every 5–90 minutes.
    fn lamp_history(&mut self, start: i64, end: i64) -> Vec<Record> {
        let mut rows = Vec::new();
        let mut ts = start;
        let mut on = false;

        while ts <= end {
            let (value, label) = if on { (100.0, "On") } else { (0.0, "Off") };
            rows.push(Record::new(ts, value).with_label(label));
            on = !on;
            ts += self.between(300, 5400);
        }

        rows
    }
}

// ---------------------------------------------------------------------------
// Store setup
// ---------------------------------------------------------------------------

/// Snapshot path from the environment, if set.
fn snapshot_path() -> Option<PathBuf> {
    std::env::var_os(SNAPSHOT_ENV).map(PathBuf::from)
}

/// Load the snapshot at `path`, or `None` if there is nothing usable there.
fn load_snapshot(path: &Path) -> Option<MemoryStore> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            info!("No snapshot at {}: {}", path.display(), e);
            return None;
        }
    };

    match MemoryStore::from_bytes(&bytes) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Ignoring unreadable snapshot {}: {}", path.display(), e);
            None
        }
    }
}

/// Fill a fresh store with `HISTORY_SECS` of synthetic rows ending at `now`.
fn generate_store(now: i64) -> hearth_core::Result<MemoryStore> {
    let mut store = MemoryStore::new();
    let mut generator = MockDeviceGenerator::new(now as u64);
    let start = now - HISTORY_SECS;

    for record in generator.thermostat_history(start, now) {
        store.insert(THERMOSTAT, record)?;
    }
    for record in generator.lamp_history(start, now) {
        store.insert(LAMP, record)?;
    }

    info!(
        "Generated {} thermostat rows and {} lamp rows",
        store.len(THERMOSTAT),
        store.len(LAMP)
    );
    Ok(store)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Run every history query for `device` and log the results.
fn report(
    service: &HistoryService<MemoryStore>,
    device: DeviceId,
    name: &str,
    now: i64,
) -> hearth_core::Result<()> {
    let last_hour = Window::new(now - 3599, now)?;

    info!("=== {} ({}) ===", name, device);

    let page =
        service.list_records(device, last_hour, SortOrder::TimestampDescending, 0, Some(5))?;
    info!(
        "Latest {} of {} records in the last hour:",
        page.records.len(),
        page.total
    );
    for record in &page.records {
        info!("  {}", record);
    }

    let stats = service.statistics(device, last_hour, None)?;
    info!(
        "Last hour: avg {:?}, min {:?}, max {:?}, trend {:.3}/h, {} distinct values",
        stats.average,
        stats.min,
        stats.max,
        stats.slope_per_hour(),
        stats.distinct_values
    );

    let histogram = service.histogram(device, last_hour)?;
    for (value, secs) in histogram.iter() {
        info!("  {} for {}s", value, secs);
    }

    for range in GraphRange::ALL {
        let points = service.graph_range(device, range, now, None)?;
        let linear = service.graph_range(device, range, now, Some(FillStrategy::Linear))?;
        info!(
            "Graph {:>3}: {} points ({} with linear fill), first {:?}, last {:?}",
            range.label(),
            points.len(),
            linear.len(),
            points.first(),
            points.last()
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn run() -> hearth_core::Result<()> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    let snapshot = snapshot_path();
    let store = match snapshot.as_deref().and_then(load_snapshot) {
        Some(store) => store,
        None => generate_store(now)?,
    };

    // A loaded snapshot may be old; query relative to its newest row
    let now = store
        .devices()
        .filter_map(|device| store.latest(device).map(|record| record.timestamp))
        .max()
        .unwrap_or(now);

    let service = HistoryService::new(store);
    report(&service, THERMOSTAT, "Thermostat", now)?;
    report(&service, LAMP, "Lamp", now)?;

    if let Some(path) = snapshot {
        let bytes = service.source().to_bytes()?;
        match std::fs::write(&path, &bytes) {
            Ok(()) => info!("Saved {} byte snapshot to {}", bytes.len(), path.display()),
            Err(e) => error!("Could not write snapshot {}: {}", path.display(), e),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    info!("Starting hearth simulator");

    match run() {
        Ok(()) => {
            info!("Simulator exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Simulator failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

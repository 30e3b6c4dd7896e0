//! Host-independent core library for hearth
//!
//! This crate contains the platform-agnostic logic for recording and
//! analysing home-automation device history: the step-series aggregation
//! engine (resampling, window averages, value-duration histograms and
//! regression slopes), the storage seam the engine reads samples through,
//! an in-memory reference store, and the query layer that turns typed
//! history requests into engine calls.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod history;
pub mod series;
pub mod storage;

pub use error::{Error, Result};

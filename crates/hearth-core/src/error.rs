use thiserror_no_std::Error;

use crate::storage::DeviceId;

/// Error types for history and aggregation operations
#[derive(Debug, Error)]
pub enum Error {
    /// Resampling interval must be strictly positive
    #[error("Invalid resampling interval: {interval_secs}s (must be > 0)")]
    InvalidInterval {
        /// The rejected interval in seconds
        interval_secs: i64,
    },

    /// Window start lies after its end
    #[error("Invalid window: min {min} > max {max}")]
    InvalidWindow {
        /// Requested window start
        min: i64,
        /// Requested window end (inclusive)
        max: i64,
    },

    /// Record listing asked for an empty page
    #[error("Invalid page size: limit must be > 0")]
    InvalidPageSize,

    /// A cursor slot was read after the series ran out
    #[error("Series cursor exhausted")]
    CursorExhausted,

    /// The store already holds a row for this device at this instant
    #[error("Duplicate timestamp {timestamp} for device {device}")]
    DuplicateTimestamp {
        /// Device the row was written for
        device: DeviceId,
        /// Conflicting timestamp
        timestamp: i64,
    },

    /// Snapshot or config bytes could not be encoded/decoded
    #[error("Encoding error: {0}")]
    Encoding(postcard::Error),
}

impl Error {
    /// True for errors caused by malformed caller parameters
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidInterval { .. } | Self::InvalidWindow { .. } | Self::InvalidPageSize
        )
    }

    /// True for errors that indicate a broken internal invariant
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::CursorExhausted)
    }
}

impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Self::Encoding(err)
    }
}

/// Result type for history and aggregation operations
pub type Result<T> = core::result::Result<T, Error>;

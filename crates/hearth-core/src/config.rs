use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::FillStrategy;

/// Default number of records per listing page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default cap on graph points (1 hour of 10s samples)
pub const DEFAULT_MAX_GRAPH_POINTS: usize = 360;

/// Query-layer defaults
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    /// Page size used when a listing does not specify one
    pub default_page_size: usize,
    /// Fill strategy used when a graph request does not specify one
    pub default_fill: FillStrategy,
    /// Upper bound on buckets per graph series; wider requests get a
    /// coarser interval
    pub max_graph_points: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            default_fill: FillStrategy::PreviousValue,
            max_graph_points: DEFAULT_MAX_GRAPH_POINTS,
        }
    }
}

impl HistoryConfig {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }
}

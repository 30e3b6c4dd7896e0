use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::Window;

/// Named graph range ending at "now"
///
/// Each range carries a point budget; the resampling interval is the range
/// duration divided by that budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphRange {
    /// 1 minute (6 points, 10s buckets)
    OneMinute,
    /// 5 minutes (30 points, 10s buckets)
    FiveMinutes,
    /// 30 minutes (36 points, 50s buckets)
    ThirtyMinutes,
    /// 1 hour (72 points, 50s buckets)
    OneHour,
    /// 12 hours (144 points, 5m buckets)
    TwelveHours,
    /// 1 day (288 points, 5m buckets)
    OneDay,
    /// 1 week (168 points, 1h buckets)
    OneWeek,
}

impl GraphRange {
    /// All ranges, shortest first
    pub const ALL: [Self; 7] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwelveHours,
        Self::OneDay,
        Self::OneWeek,
    ];

    /// Axis caption for a graph drawn over this range
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
        }
    }

    /// Seconds of history the graph looks back from "now"
    pub const fn duration_secs(self) -> i64 {
        match self {
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
            Self::ThirtyMinutes => 1800,
            Self::OneHour => 3600,
            Self::TwelveHours => 43200,
            Self::OneDay => 86400,
            Self::OneWeek => 604800,
        }
    }

    /// Bucket budget for the graph: one plotted point per bucket at most
    pub const fn max_points(self) -> usize {
        match self {
            Self::OneMinute => 6,
            Self::FiveMinutes => 30,
            Self::ThirtyMinutes => 36,
            Self::OneHour => 72,
            Self::TwelveHours => 144,
            Self::OneDay => 288,
            Self::OneWeek => 168,
        }
    }

    /// Resampling interval, `duration_secs / max_points`, never below one
    pub const fn interval_secs(self) -> i64 {
        let interval = self.duration_secs() / self.max_points() as i64;
        if interval < 1 { 1 } else { interval }
    }

    /// Window of this range ending at `now` (inclusive)
    pub fn window_ending_at(self, now: i64) -> Result<Window> {
        Window::new(now.saturating_sub(self.duration_secs() - 1), now)
    }
}

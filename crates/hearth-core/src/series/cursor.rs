use crate::error::{Error, Result};

use super::Sample;

/// Forward-only cursor with one sample of lookahead
///
/// Every aggregation walks the series through this cursor: it needs the
/// `current` sample, the `next` one (to know where the current step ends
/// and, for linear fill, where it is heading) and the series end boundary.
///
/// The underlying iterator is consumed exactly once; a cursor cannot be
/// rewound.
pub struct SeriesCursor<I>
where
    I: Iterator<Item = Sample>,
{
    samples: I,
    current: Option<Sample>,
    next: Option<Sample>,
    /// Effective end of the series' validity, usually `window.max + 1`
    series_end: i64,
}

impl<I> SeriesCursor<I>
where
    I: Iterator<Item = Sample>,
{
    /// Create a cursor, eagerly pulling up to two samples
    pub fn new<S>(samples: S, series_end: i64) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        let mut samples = samples.into_iter();
        let current = samples.next();
        let next = samples.next();

        Self {
            samples,
            current,
            next,
            series_end,
        }
    }

    /// Whether the current slot holds a sample
    pub fn is_current_valid(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the lookahead slot holds a sample
    pub fn is_next_valid(&self) -> bool {
        self.next.is_some()
    }

    /// The sample whose step is being consumed
    pub fn current(&self) -> Result<Sample> {
        self.current.ok_or(Error::CursorExhausted)
    }

    /// The sample after the current one
    pub fn next(&self) -> Result<Sample> {
        self.next.ok_or(Error::CursorExhausted)
    }

    /// Boundary the cursor was created with
    pub fn series_end(&self) -> i64 {
        self.series_end
    }

    /// End of the current sample's active interval
    ///
    /// With a following sample this is `min(next.timestamp, series_end)`;
    /// the last sample runs until `max(series_end, current.timestamp)`.
    pub fn finish_of_current_step(&self) -> Result<i64> {
        let current = self.current()?;
        Ok(match self.next {
            Some(next) => next.timestamp.min(self.series_end),
            None => self.series_end.max(current.timestamp),
        })
    }

    /// Move the lookahead sample into the current slot
    pub fn advance(&mut self) {
        self.current = self.next.take();
        if self.current.is_some() {
            self.next = self.samples.next();
        }
    }
}

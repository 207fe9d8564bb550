//! Tenor and simulation time grids.
//!
//! A [`TimeGrid`] is an ordered, strictly increasing set of time points
//! (year fractions). The same type serves as a product's cash-flow
//! schedule and as a simulation discretisation; two grids can be merged
//! with [`TimeGrid::union`].

use crate::error::ConfigurationError;

/// Tolerance under which two time points are considered identical.
///
/// Used when merging grids and when looking up pillar indices, so that
/// points differing only by floating-point round-off collapse to one.
pub const TIME_TOLERANCE: f64 = 1.0e-9;

/// Placement of the shorter "stub" period when the period length does not
/// divide the grid span evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubPlacement {
    /// The shorter period sits at the start of the grid.
    AtStart,
    /// The shorter period sits at the end of the grid.
    AtEnd,
}

/// An ordered, strictly increasing, immutable set of time points.
///
/// # Invariants
///
/// All times are finite and strictly increasing. A grid always has at
/// least two points (one step). Constructed once, shared read-only.
///
/// # Examples
///
/// ```
/// use lmm_core::{StubPlacement, TimeGrid};
///
/// // Annual periods over five years, no stub needed.
/// let grid = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
/// assert_eq!(grid.number_of_steps(), 5);
/// assert_eq!(grid.time_at(3), 3.0);
///
/// // A 0.4 period over [0, 1] leaves a 0.2 stub.
/// let stubbed = TimeGrid::new(0.0, 1.0, 0.4, StubPlacement::AtEnd).unwrap();
/// assert_eq!(stubbed.times(), &[0.0, 0.4, 0.8, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Generate a grid of equal-length periods from `start` to `end`.
    ///
    /// When `period_length` does not divide `end - start` evenly, exactly
    /// one shorter stub period is produced, placed according to `stub`.
    /// Zero-length periods are never produced.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPeriod`] when `end <= start`,
    /// `period_length <= 0`, or any input is not finite.
    pub fn new(
        start: f64,
        end: f64,
        period_length: f64,
        stub: StubPlacement,
    ) -> Result<Self, ConfigurationError> {
        if !start.is_finite() || !end.is_finite() || !period_length.is_finite() {
            return Err(ConfigurationError::InvalidPeriod {
                start,
                end,
                period_length,
            });
        }
        if end <= start || period_length <= 0.0 {
            return Err(ConfigurationError::InvalidPeriod {
                start,
                end,
                period_length,
            });
        }

        let span = end - start;
        let whole_periods = (span / period_length + TIME_TOLERANCE).floor() as usize;
        let remainder = span - whole_periods as f64 * period_length;
        let has_stub = remainder > TIME_TOLERANCE;

        let mut times = Vec::with_capacity(whole_periods + 2);
        times.push(start);
        match stub {
            StubPlacement::AtStart => {
                if has_stub {
                    times.push(start + remainder);
                }
                for i in 1..=whole_periods {
                    times.push(start + remainder + i as f64 * period_length);
                }
            }
            StubPlacement::AtEnd => {
                for i in 1..=whole_periods {
                    times.push(start + i as f64 * period_length);
                }
                if has_stub {
                    times.push(end);
                }
            }
        }

        // Snap the final point onto the requested end to stop round-off
        // accumulating across periods.
        if let Some(last) = times.last_mut() {
            *last = end;
        }

        Self::from_times(times)
    }

    /// Build a grid from an explicit list of time points.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyGrid`] for fewer than two points
    /// and [`ConfigurationError::NonMonotonicTimes`] when the points are
    /// not finite and strictly increasing.
    pub fn from_times(times: Vec<f64>) -> Result<Self, ConfigurationError> {
        if times.len() < 2 {
            return Err(ConfigurationError::empty_grid(2, times.len()));
        }
        if !times[0].is_finite() {
            return Err(ConfigurationError::non_monotonic(0));
        }
        for i in 1..times.len() {
            if !times[i].is_finite() || times[i] <= times[i - 1] {
                return Err(ConfigurationError::non_monotonic(i));
            }
        }
        Ok(Self { times })
    }

    /// The time at point index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn time_at(&self, i: usize) -> f64 {
        self.times[i]
    }

    /// All time points, in increasing order.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of time points.
    #[inline]
    pub fn number_of_times(&self) -> usize {
        self.times.len()
    }

    /// Number of periods (steps) between consecutive points.
    #[inline]
    pub fn number_of_steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Length of period `i`, i.e. `time_at(i + 1) - time_at(i)`.
    ///
    /// # Panics
    ///
    /// Panics if `i + 1` is out of range.
    #[inline]
    pub fn time_step(&self, i: usize) -> f64 {
        self.times[i + 1] - self.times[i]
    }

    /// First time point.
    #[inline]
    pub fn first_time(&self) -> f64 {
        self.times[0]
    }

    /// Last time point.
    #[inline]
    pub fn last_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Index of the point equal to `time` (within [`TIME_TOLERANCE`]).
    pub fn index_of(&self, time: f64) -> Option<usize> {
        self.times
            .iter()
            .position(|t| (t - time).abs() <= TIME_TOLERANCE)
    }

    /// Largest index whose time is `<= time` (within tolerance).
    ///
    /// Returns `None` when `time` lies before the first grid point.
    pub fn lower_index(&self, time: f64) -> Option<usize> {
        if time < self.times[0] - TIME_TOLERANCE {
            return None;
        }
        let mut idx = 0;
        for (i, t) in self.times.iter().enumerate() {
            if *t <= time + TIME_TOLERANCE {
                idx = i;
            } else {
                break;
            }
        }
        Some(idx)
    }

    /// Strictly sorted, deduplicated merge of the point sets of `self`
    /// and `other`.
    ///
    /// Points closer than [`TIME_TOLERANCE`] collapse to the point of
    /// `self` where both grids carry one. The result contains every point
    /// of both grids exactly once; the operation is symmetric as a point
    /// set.
    pub fn union(&self, other: &TimeGrid) -> TimeGrid {
        let mut merged = Vec::with_capacity(self.times.len() + other.times.len());
        let (mut i, mut j) = (0, 0);
        while i < self.times.len() || j < other.times.len() {
            let next = match (self.times.get(i), other.times.get(j)) {
                (Some(a), Some(b)) => {
                    if (a - b).abs() <= TIME_TOLERANCE {
                        j += 1;
                        i += 1;
                        *a
                    } else if a < b {
                        i += 1;
                        *a
                    } else {
                        j += 1;
                        *b
                    }
                }
                (Some(a), None) => {
                    i += 1;
                    *a
                }
                (None, Some(b)) => {
                    j += 1;
                    *b
                }
                (None, None) => break,
            };
            merged.push(next);
        }
        // Both inputs are valid grids, so the merge is strictly increasing.
        TimeGrid { times: merged }
    }
}

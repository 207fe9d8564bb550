//! Configuration error types shared across the workspace.
//!
//! Every error in this enum is detectable at construction time; nothing
//! here is raised during simulation or product evaluation.

use thiserror::Error;

/// Errors raised while constructing grids, curves or model configurations.
///
/// Configuration errors are fatal to the caller: the offending object is
/// never partially constructed.
///
/// # Examples
///
/// ```
/// use lmm_core::ConfigurationError;
///
/// let err = ConfigurationError::InvalidPeriod {
///     start: 1.0,
///     end: 0.0,
///     period_length: 0.5,
/// };
/// assert!(format!("{}", err).contains("period"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Grid or pillar set has no usable points.
    #[error("Empty grid: at least {required} points are required, got {provided}")]
    EmptyGrid {
        /// Minimum number of points required
        required: usize,
        /// Number of points provided
        provided: usize,
    },

    /// Times are not strictly increasing (or not finite) at an index.
    #[error("Times must be finite and strictly increasing (violated at index {index})")]
    NonMonotonicTimes {
        /// Index of the first offending point
        index: usize,
    },

    /// Invalid period specification for grid generation.
    #[error(
        "Invalid period specification: start = {start}, end = {end}, period length = {period_length} \
         (end must exceed start and the period length must be positive)"
    )]
    InvalidPeriod {
        /// Requested grid start
        start: f64,
        /// Requested grid end
        end: f64,
        /// Requested period length
        period_length: f64,
    },

    /// Parallel pillar arrays have different lengths.
    #[error("Pillar count ({times}) must match value count ({values})")]
    PillarMismatch {
        /// Number of pillar times
        times: usize,
        /// Number of pillar values
        values: usize,
    },

    /// A pillar carries a value outside its admissible range.
    #[error("Invalid pillar value {value} at time {time}: {constraint}")]
    InvalidPillarValue {
        /// Pillar time
        time: f64,
        /// Offending value
        value: f64,
        /// Constraint that was violated
        constraint: &'static str,
    },

    /// Factor dimensions of two collaborating components disagree.
    #[error(
        "Factor count mismatch: covariance model supplies {covariance} factors, \
         Brownian generator supplies {generator}"
    )]
    FactorCountMismatch {
        /// Factor count of the covariance model
        covariance: usize,
        /// Factor count of the random generator
        generator: usize,
    },

    /// A required grid point is missing from a containing grid.
    #[error("Process grid does not contain tenor time {time}")]
    MissingGridPoint {
        /// The tenor time absent from the process grid
        time: f64,
    },

    /// General invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ConfigurationError {
    /// Create an empty-grid error.
    pub fn empty_grid(required: usize, provided: usize) -> Self {
        Self::EmptyGrid { required, provided }
    }

    /// Create a non-monotonic-times error.
    pub fn non_monotonic(index: usize) -> Self {
        Self::NonMonotonicTimes { index }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check whether this is a factor-count mismatch.
    pub fn is_factor_count_mismatch(&self) -> bool {
        matches!(self, Self::FactorCountMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_diagnostics() {
        let err = ConfigurationError::empty_grid(2, 0);
        assert!(err.to_string().contains("at least 2"));

        let err = ConfigurationError::FactorCountMismatch {
            covariance: 3,
            generator: 1,
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("1"));
        assert!(err.is_factor_count_mismatch());
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ConfigurationError::non_monotonic(4);
        let _: &dyn std::error::Error = &err;
    }
}

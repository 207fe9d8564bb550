//! Initial forward-rate curve.

use super::{bracket_index, validate_pillars};
use crate::error::ConfigurationError;
use num_traits::Float;

/// A deterministic time-0 forward-rate curve.
///
/// Pillar times are fixing times; the value at a pillar is the simple
/// forward rate applying over the curve's `period_length` from that
/// fixing. Lookups interpolate linearly on the rate between pillars and
/// extrapolate flat outside the pillar range.
///
/// # Examples
///
/// ```
/// use lmm_core::ForwardCurve;
///
/// let curve = ForwardCurve::from_forwards(
///     "EUR-6M",
///     vec![0.0, 1.0, 2.0],
///     vec![0.01, 0.03, 0.02],
///     0.5,
/// )
/// .unwrap();
///
/// assert_eq!(curve.forward(1.0), 0.03);
/// assert_eq!(curve.forward(1.5), 0.025); // linear between pillars
/// assert_eq!(curve.forward(-1.0), 0.01); // flat extrapolation
/// assert_eq!(curve.forward(9.0), 0.02);
/// ```
#[derive(Debug, Clone)]
pub struct ForwardCurve<T: Float> {
    name: String,
    times: Vec<T>,
    forwards: Vec<T>,
    period_length: T,
}

impl<T: Float> ForwardCurve<T> {
    /// Build a forward curve from parallel arrays of fixing times and
    /// simple forward rates.
    ///
    /// # Arguments
    ///
    /// * `name` - Curve label (e.g. "EUR-6M")
    /// * `times` - Pillar fixing times, strictly increasing
    /// * `forwards` - Simple forward rate at each pillar
    /// * `period_length` - Accrual period the quoted rates apply over
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for mismatched array lengths,
    /// empty pillars, non-monotonic times, non-finite values, or a
    /// non-positive `period_length`.
    pub fn from_forwards(
        name: impl Into<String>,
        times: Vec<T>,
        forwards: Vec<T>,
        period_length: T,
    ) -> Result<Self, ConfigurationError> {
        validate_pillars(&times, &forwards)?;
        if !period_length.is_finite() || period_length <= T::zero() {
            return Err(ConfigurationError::invalid_input(
                "forward curve period length must be positive",
            ));
        }
        Ok(Self {
            name: name.into(),
            times,
            forwards,
            period_length,
        })
    }

    /// Curve label.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accrual period the quoted forwards apply over.
    #[inline]
    pub fn period_length(&self) -> T {
        self.period_length
    }

    /// Pillar fixing times.
    #[inline]
    pub fn times(&self) -> &[T] {
        &self.times
    }

    /// Simple forward rate for a period fixing at `fixing_time`.
    ///
    /// Linear interpolation on the rate between pillars; flat
    /// extrapolation before the first and after the last pillar.
    pub fn forward(&self, fixing_time: T) -> T {
        let n = self.times.len();
        if fixing_time <= self.times[0] {
            return self.forwards[0];
        }
        if fixing_time >= self.times[n - 1] {
            return self.forwards[n - 1];
        }
        let idx = bracket_index(&self.times, fixing_time);
        let (t0, t1) = (self.times[idx], self.times[idx + 1]);
        let (v0, v1) = (self.forwards[idx], self.forwards[idx + 1]);
        let w = (fixing_time - t0) / (t1 - t0);
        v0 + w * (v1 - v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_curve() -> ForwardCurve<f64> {
        ForwardCurve::from_forwards(
            "TEST",
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![0.01, 0.03, 0.025, 0.02, 0.015],
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_pillar_values_are_reproduced() {
        let curve = sample_curve();
        assert_relative_eq!(curve.forward(0.0), 0.01);
        assert_relative_eq!(curve.forward(2.0), 0.025);
        assert_relative_eq!(curve.forward(4.0), 0.015);
    }

    #[test]
    fn test_linear_interpolation_between_pillars() {
        let curve = sample_curve();
        assert_relative_eq!(curve.forward(0.5), 0.02);
        assert_relative_eq!(curve.forward(2.5), 0.0225);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = sample_curve();
        assert_relative_eq!(curve.forward(-2.0), 0.01);
        assert_relative_eq!(curve.forward(10.0), 0.015);
    }

    #[test]
    fn test_construction_validation() {
        assert!(
            ForwardCurve::from_forwards("X", vec![0.0, 1.0], vec![0.01], 1.0).is_err(),
            "mismatched lengths must fail"
        );
        assert!(ForwardCurve::<f64>::from_forwards("X", vec![], vec![], 1.0).is_err());
        assert!(ForwardCurve::from_forwards("X", vec![1.0, 1.0], vec![0.01, 0.02], 1.0).is_err());
        assert!(
            ForwardCurve::from_forwards("X", vec![0.0, 1.0], vec![0.01, f64::NAN], 1.0).is_err()
        );
        assert!(ForwardCurve::from_forwards("X", vec![0.0, 1.0], vec![0.01, 0.02], 0.0).is_err());
    }
}

//! Initial discount-factor curve.

use super::{bracket_index, validate_pillars};
use crate::error::ConfigurationError;
use num_traits::Float;

/// A deterministic time-0 discount-factor curve.
///
/// The pillar `(0, 1.0)` is implied and prepended unless supplied.
/// Lookups interpolate log-linearly between pillars (piecewise-constant
/// forward rate) and extrapolate beyond the last pillar with the final
/// segment's forward rate.
///
/// # Examples
///
/// ```
/// use lmm_core::DiscountCurve;
///
/// let curve =
///     DiscountCurve::from_discount_factors("EUR-OIS", vec![1.0, 2.0], vec![0.98, 0.95]).unwrap();
///
/// assert_eq!(curve.discount_factor(0.0), 1.0);
/// assert_eq!(curve.discount_factor(2.0), 0.95);
/// let mid = curve.discount_factor(1.5);
/// assert!(mid < 0.98 && mid > 0.95);
/// ```
#[derive(Debug, Clone)]
pub struct DiscountCurve<T: Float> {
    name: String,
    times: Vec<T>,
    discount_factors: Vec<T>,
}

impl<T: Float> DiscountCurve<T> {
    /// Build a discount curve from parallel arrays of maturities and
    /// discount factors.
    ///
    /// # Arguments
    ///
    /// * `name` - Curve label (e.g. "EUR-OIS")
    /// * `times` - Pillar maturities, strictly increasing, all positive
    /// * `discount_factors` - Discount factor at each pillar, in (0, 1]
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for mismatched array lengths,
    /// empty pillars, non-monotonic or non-positive times, or discount
    /// factors outside (0, 1].
    pub fn from_discount_factors(
        name: impl Into<String>,
        times: Vec<T>,
        discount_factors: Vec<T>,
    ) -> Result<Self, ConfigurationError> {
        validate_pillars(&times, &discount_factors)?;
        for (t, df) in times.iter().zip(&discount_factors) {
            if *df <= T::zero() || *df > T::one() {
                return Err(ConfigurationError::InvalidPillarValue {
                    time: t.to_f64().unwrap_or(f64::NAN),
                    value: df.to_f64().unwrap_or(f64::NAN),
                    constraint: "discount factor must lie in (0, 1]",
                });
            }
        }
        if times[0] < T::zero() {
            return Err(ConfigurationError::invalid_input(
                "discount curve pillars must not lie before time 0",
            ));
        }

        let (mut times, mut discount_factors) = (times, discount_factors);
        if times[0] > T::zero() {
            times.insert(0, T::zero());
            discount_factors.insert(0, T::one());
        }

        Ok(Self {
            name: name.into(),
            times,
            discount_factors,
        })
    }

    /// Curve label.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pillar maturities, including the implied time-0 pillar.
    #[inline]
    pub fn times(&self) -> &[T] {
        &self.times
    }

    /// Discount factor for maturity `time`.
    ///
    /// Log-linear interpolation between pillars; maturities past the last
    /// pillar extrapolate with the final segment's forward rate, and
    /// `time <= 0` returns 1.
    pub fn discount_factor(&self, time: T) -> T {
        if time <= T::zero() {
            return T::one();
        }
        let n = self.times.len();
        if n == 1 {
            return T::one();
        }

        let (idx, upper) = if time >= self.times[n - 1] {
            (n - 2, n - 1)
        } else {
            let idx = bracket_index(&self.times, time);
            (idx, idx + 1)
        };

        let (t0, t1) = (self.times[idx], self.times[upper]);
        let (ln0, ln1) = (
            self.discount_factors[idx].ln(),
            self.discount_factors[upper].ln(),
        );
        let w = (time - t0) / (t1 - t0);
        (ln0 + w * (ln1 - ln0)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_curve() -> DiscountCurve<f64> {
        DiscountCurve::from_discount_factors(
            "TEST",
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![0.98, 0.95, 0.94, 0.92, 0.9],
        )
        .unwrap()
    }

    #[test]
    fn test_implied_time_zero_pillar() {
        let curve = sample_curve();
        assert_relative_eq!(curve.discount_factor(0.0), 1.0);
        assert_relative_eq!(curve.discount_factor(-1.0), 1.0);
    }

    #[test]
    fn test_pillar_values_are_reproduced() {
        let curve = sample_curve();
        assert_relative_eq!(curve.discount_factor(1.0), 0.98, epsilon = 1e-12);
        assert_relative_eq!(curve.discount_factor(3.0), 0.94, epsilon = 1e-12);
        assert_relative_eq!(curve.discount_factor(5.0), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_log_linear_interpolation() {
        let curve = sample_curve();
        let expected = (0.5 * 0.98_f64.ln() + 0.5 * 0.95_f64.ln()).exp();
        assert_relative_eq!(curve.discount_factor(1.5), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_forward_extrapolation_decreases() {
        let curve = sample_curve();
        let df6 = curve.discount_factor(6.0);
        let expected = 0.9 * (0.9_f64 / 0.92).powf(1.0);
        assert_relative_eq!(df6, expected, epsilon = 1e-12);
        assert!(df6 < 0.9);
    }

    #[test]
    fn test_construction_validation() {
        assert!(DiscountCurve::from_discount_factors("X", vec![1.0], vec![1.2]).is_err());
        assert!(DiscountCurve::from_discount_factors("X", vec![1.0], vec![0.0]).is_err());
        assert!(DiscountCurve::from_discount_factors("X", vec![-1.0, 1.0], vec![0.99, 0.98])
            .is_err());
        assert!(DiscountCurve::from_discount_factors("X", vec![1.0, 1.0], vec![0.98, 0.95])
            .is_err());
        assert!(DiscountCurve::<f64>::from_discount_factors("X", vec![], vec![]).is_err());
    }
}

//! Deterministic time-0 curves.
//!
//! Curves are pure lookup structures built from pillar points by the
//! `create-from` factory functions; they carry no simulation dependency.
//! Both are generic over the floating-point type for compatibility with
//! generic numeric code.

mod discount;
mod forward;

pub use discount::DiscountCurve;
pub use forward::ForwardCurve;

use crate::error::ConfigurationError;
use num_traits::Float;

/// Validate parallel pillar arrays: equal non-zero lengths, finite values,
/// strictly increasing times.
pub(crate) fn validate_pillars<T: Float>(
    times: &[T],
    values: &[T],
) -> Result<(), ConfigurationError> {
    if times.len() != values.len() {
        return Err(ConfigurationError::PillarMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    if times.is_empty() {
        return Err(ConfigurationError::empty_grid(1, 0));
    }
    for i in 0..times.len() {
        if !times[i].is_finite() || (i > 0 && times[i] <= times[i - 1]) {
            return Err(ConfigurationError::non_monotonic(i));
        }
        if !values[i].is_finite() {
            return Err(ConfigurationError::InvalidPillarValue {
                time: times[i].to_f64().unwrap_or(f64::NAN),
                value: values[i].to_f64().unwrap_or(f64::NAN),
                constraint: "value must be finite",
            });
        }
    }
    Ok(())
}

/// Index of the last pillar with `times[idx] <= t`, given `t >= times[0]`.
pub(crate) fn bracket_index<T: Float>(times: &[T], t: T) -> usize {
    let mut idx = 0;
    for (i, pillar) in times.iter().enumerate() {
        if *pillar <= t {
            idx = i;
        } else {
            break;
        }
    }
    idx
}

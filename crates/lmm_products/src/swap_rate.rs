//! Par swap rate as a path-wise market quantity.

use lmm_core::{RandomVariable, TimeGrid, TIME_TOLERANCE};
use lmm_engine::LmmSimulation;

use crate::error::EvaluationError;
use crate::product::Product;

/// The par rate of a fixed-for-floating swap, evaluated per path.
///
/// On each path the par rate is the ratio of the floating-leg value to
/// the fixed-leg annuity,
///
/// ```text
/// S(t) = sum_i L_i(t) tau_i / N(T_i^pay)  /  sum_j tau_j / N(T_j^pay)
/// ```
///
/// with `L_i(t)` the path's forward for floating period `i`, `tau` the
/// period lengths, and `N` the path's numeraire realisation at each
/// payment date (the common `N(t)` factor cancels in the ratio). Both
/// legs are restricted to periods starting at or after the evaluation
/// time; a leg with no remaining periods is a domain error, never a NaN.
pub struct SwapMarketRateProduct {
    float_leg: TimeGrid,
    fixed_leg: TimeGrid,
}

impl SwapMarketRateProduct {
    /// Create the par-rate product for the given leg schedules.
    ///
    /// Leg points are period boundaries: period `i` runs from point `i`
    /// to point `i + 1` and pays at its end.
    pub fn new(float_leg: TimeGrid, fixed_leg: TimeGrid) -> Self {
        Self {
            float_leg,
            fixed_leg,
        }
    }

    /// The floating-leg schedule.
    #[inline]
    pub fn float_leg(&self) -> &TimeGrid {
        &self.float_leg
    }

    /// The fixed-leg schedule.
    #[inline]
    pub fn fixed_leg(&self) -> &TimeGrid {
        &self.fixed_leg
    }
}

/// Periods of `leg` whose start is at or after `time`, as
/// `(start, end)` pairs.
fn remaining_periods(leg: &TimeGrid, time: f64) -> Vec<(f64, f64)> {
    (0..leg.number_of_steps())
        .map(|i| (leg.time_at(i), leg.time_at(i + 1)))
        .filter(|(start, _)| *start >= time - TIME_TOLERANCE)
        .collect()
}

impl Product for SwapMarketRateProduct {
    fn value(
        &self,
        evaluation_time: f64,
        simulation: &LmmSimulation,
    ) -> Result<RandomVariable, EvaluationError> {
        let float_periods = remaining_periods(&self.float_leg, evaluation_time);
        let fixed_periods = remaining_periods(&self.fixed_leg, evaluation_time);
        if float_periods.is_empty() {
            return Err(EvaluationError::EmptySchedule {
                leg: "floating",
                evaluation_time,
            });
        }
        if fixed_periods.is_empty() {
            return Err(EvaluationError::EmptySchedule {
                leg: "fixed",
                evaluation_time,
            });
        }

        let paths = simulation.number_of_paths();
        let mut float_value = vec![0.0; paths];
        for (start, end) in &float_periods {
            let forward = simulation.forward_rate(evaluation_time, *start, *end)?;
            let numeraire = simulation.numeraire(*end)?;
            let accrual = end - start;
            for path in 0..paths {
                float_value[path] += forward.get(path) * accrual / numeraire.get(path);
            }
        }

        let mut annuity = vec![0.0; paths];
        for (start, end) in &fixed_periods {
            let numeraire = simulation.numeraire(*end)?;
            let accrual = end - start;
            for path in 0..paths {
                annuity[path] += accrual / numeraire.get(path);
            }
        }

        let values = float_value
            .into_iter()
            .zip(annuity)
            .map(|(float, annuity)| float / annuity)
            .collect();
        Ok(RandomVariable::new(evaluation_time, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmm_core::StubPlacement;

    #[test]
    fn test_remaining_periods_are_restricted_to_the_future() {
        let leg = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
        assert_eq!(remaining_periods(&leg, 0.0).len(), 5);
        assert_eq!(remaining_periods(&leg, 2.0).len(), 3);
        assert_eq!(remaining_periods(&leg, 2.5).len(), 2);
        assert!(remaining_periods(&leg, 4.5).is_empty());
    }
}

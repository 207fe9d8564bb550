//! Plain fixed-for-floating payer swap.

use lmm_core::{RandomVariable, TimeGrid, TIME_TOLERANCE};
use lmm_engine::LmmSimulation;

use crate::error::EvaluationError;
use crate::product::Product;

/// A payer swap (receive floating, pay fixed) on a shared schedule.
///
/// Each period's floating fixing is the path's forward rate observed at
/// the period start; both cash flows pay at the period end, are deflated
/// by the path's numeraire at payment, and are re-expressed at the
/// evaluation time with the numeraire observed there. Only periods
/// starting at or after the evaluation time contribute.
pub struct SimpleSwap {
    schedule: TimeGrid,
    fixed_rate: f64,
    notional: f64,
}

impl SimpleSwap {
    /// Create a payer swap on `schedule` exchanging `fixed_rate` against
    /// the floating fixings.
    pub fn new(schedule: TimeGrid, fixed_rate: f64, notional: f64) -> Self {
        Self {
            schedule,
            fixed_rate,
            notional,
        }
    }

    /// The shared period schedule.
    #[inline]
    pub fn schedule(&self) -> &TimeGrid {
        &self.schedule
    }

    /// The fixed rate paid.
    #[inline]
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// The contract notional.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.notional
    }
}

impl Product for SimpleSwap {
    fn value(
        &self,
        evaluation_time: f64,
        simulation: &LmmSimulation,
    ) -> Result<RandomVariable, EvaluationError> {
        let periods: Vec<(f64, f64)> = (0..self.schedule.number_of_steps())
            .map(|i| (self.schedule.time_at(i), self.schedule.time_at(i + 1)))
            .filter(|(start, _)| *start >= evaluation_time - TIME_TOLERANCE)
            .collect();
        if periods.is_empty() {
            return Err(EvaluationError::EmptySchedule {
                leg: "swap",
                evaluation_time,
            });
        }

        let paths = simulation.number_of_paths();
        let mut deflated = vec![0.0; paths];
        for (start, end) in &periods {
            // Fixing is path-wise at the period start, not at the
            // evaluation time.
            let fixing = simulation.forward_rate(*start, *start, *end)?;
            let numeraire_at_payment = simulation.numeraire(*end)?;
            let accrual = end - start;
            for path in 0..paths {
                deflated[path] += (fixing.get(path) - self.fixed_rate) * accrual
                    * self.notional
                    / numeraire_at_payment.get(path);
            }
        }

        let numeraire_at_evaluation = simulation.numeraire(evaluation_time)?;
        let values = deflated
            .into_iter()
            .enumerate()
            .map(|(path, value)| value * numeraire_at_evaluation.get(path))
            .collect();
        Ok(RandomVariable::new(evaluation_time, values))
    }
}

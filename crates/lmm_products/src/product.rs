//! The product evaluation seam.

use lmm_core::RandomVariable;
use lmm_engine::LmmSimulation;

use crate::error::EvaluationError;

/// A path-wise evaluator of some market quantity or payoff.
///
/// Implementations read observables from the simulation (forward rates,
/// numeraire realisations) and report one value per path, expressed at
/// the evaluation time. They hold schedule and contract data only; all
/// model state lives in the simulation.
pub trait Product: Send + Sync {
    /// Evaluate the product at `evaluation_time` on every simulated path.
    ///
    /// # Errors
    ///
    /// Domain errors when the product is undefined at the evaluation time
    /// (for example an empty remaining schedule), or a wrapped
    /// simulation error.
    fn value(
        &self,
        evaluation_time: f64,
        simulation: &LmmSimulation,
    ) -> Result<RandomVariable, EvaluationError>;
}

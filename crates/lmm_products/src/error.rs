//! Product evaluation errors.

use lmm_engine::SimulationError;
use thiserror::Error;

/// Errors raised while evaluating a product on a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// A leg has no periods left at the evaluation time, so the requested
    /// quantity is undefined.
    #[error("The {leg} leg has no periods at or after the evaluation time {evaluation_time}")]
    EmptySchedule {
        /// Which leg was empty ("floating" or "fixed")
        leg: &'static str,
        /// The evaluation time the schedule was restricted to
        evaluation_time: f64,
    },

    /// The underlying simulation failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl EvaluationError {
    /// Check whether this is an empty-schedule domain error.
    pub fn is_empty_schedule(&self) -> bool {
        matches!(self, Self::EmptySchedule { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_schedule_display_names_the_leg() {
        let err = EvaluationError::EmptySchedule {
            leg: "fixed",
            evaluation_time: 5.0,
        };
        assert!(err.to_string().contains("fixed leg"));
        assert!(err.is_empty_schedule());
    }
}

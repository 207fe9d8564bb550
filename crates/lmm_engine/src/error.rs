//! Simulation error types.
//!
//! Configuration problems are wrapped from `lmm_core` and detected at
//! engine construction; numerical breakdowns are raised during step
//! evolution with enough context (step, time, path) to diagnose the
//! failing realisation. Nothing is silently clamped.

use lmm_core::ConfigurationError;
use thiserror::Error;

/// Errors raised by the simulation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Inconsistent configuration, detected before any simulation work.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Numerical breakdown during path evolution.
    #[error("Numerical failure at step {step} (t = {time}), path {path}: {message}")]
    Numerical {
        /// Simulation step index at which the failure occurred
        step: usize,
        /// Simulation time of that step
        time: f64,
        /// Path index of the failing realisation
        path: usize,
        /// Description of the breakdown
        message: String,
    },

    /// Covariance factorisation broke down.
    #[error("Covariance factorisation failed: {message}")]
    Factorisation {
        /// Description of the breakdown
        message: String,
    },

    /// A requested time lies outside the simulated horizon.
    #[error("Time {time} is outside the simulated horizon [0, {horizon}]")]
    TimeOutOfRange {
        /// The requested time
        time: f64,
        /// Last simulated time
        horizon: f64,
    },
}

impl SimulationError {
    /// Create a numerical-failure error.
    pub fn numerical(step: usize, time: f64, path: usize, message: impl Into<String>) -> Self {
        Self::Numerical {
            step,
            time,
            path,
            message: message.into(),
        }
    }

    /// Check whether this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check whether this is a numerical failure.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::Numerical { .. })
    }
}

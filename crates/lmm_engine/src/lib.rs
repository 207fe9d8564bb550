//! Monte Carlo LIBOR market model simulation engine.
//!
//! This crate evolves a vector of simple forward rates under the discrete
//! spot measure and exposes path-wise market observables to product
//! evaluators:
//!
//! - [`CovarianceModel`] / [`ExponentialForm5Param`]: factor loadings per
//!   step and forward rate
//! - [`BrownianMotion`]: pre-generated, reproducible factor increments
//! - [`LmmSimulation`]: lazy, step-cached, parallel path evolution with a
//!   discount-curve-adjusted spot numeraire
//!
//! Simulation is demand-driven: constructing an [`LmmSimulation`] does no
//! numerical work, and queries extend a shared forward-only step cache.

pub mod brownian;
pub mod covariance;
pub mod engine;
pub mod error;

pub use brownian::BrownianMotion;
pub use covariance::{CovarianceModel, ExponentialForm5Param};
pub use engine::{DiscretisationScheme, LmmConfig, LmmConfigBuilder, LmmSimulation, StepState};
pub use error::SimulationError;

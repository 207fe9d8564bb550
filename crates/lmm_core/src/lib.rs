//! Core primitives for LMM market-quantity simulation.
//!
//! This crate provides the shared, simulation-free building blocks:
//!
//! - [`TimeGrid`]: ordered time discretisations and cash-flow schedules
//! - [`ForwardCurve`] / [`DiscountCurve`]: deterministic time-0 curves
//! - [`RandomVariable`]: path-indexed scalar results
//! - [`ConfigurationError`]: construction-time error taxonomy
//!
//! Everything here is immutable after construction and safe to share
//! read-only across the simulation engine and product evaluators.

pub mod curves;
pub mod error;
pub mod random_variable;
pub mod time_grid;

pub use curves::{DiscountCurve, ForwardCurve};
pub use error::ConfigurationError;
pub use random_variable::RandomVariable;
pub use time_grid::{StubPlacement, TimeGrid, TIME_TOLERANCE};

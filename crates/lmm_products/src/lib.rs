//! Path-wise product evaluators on the LMM simulation engine.
//!
//! The [`Product`] trait is the seam between the simulation and anything
//! valued on it. This crate ships the evaluators needed for modelled
//! market quantities:
//!
//! - [`SwapMarketRateProduct`]: the par swap rate, per path
//! - [`SimpleSwap`]: a payer swap's deflated value, per path
//! - [`ModelledMarketQuantity`]: a [`SimmCoordinate`]-keyed quantity
//!   built from a product factory over evaluation times
//!
//! Enable the `serde` feature to serialise the coordinate types.

pub mod error;
pub mod product;
pub mod quantity;
pub mod swap;
pub mod swap_rate;

pub use error::EvaluationError;
pub use product::Product;
pub use quantity::{ModelledMarketQuantity, RiskClass, SimmCoordinate};
pub use swap::SimpleSwap;
pub use swap_rate::SwapMarketRateProduct;

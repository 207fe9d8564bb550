//! Modelled market quantities keyed by risk coordinates.

use std::fmt;

use lmm_core::{RandomVariable, StubPlacement, TimeGrid};
use lmm_engine::{LmmSimulation, SimulationError};

use crate::error::EvaluationError;
use crate::product::Product;
use crate::swap_rate::SwapMarketRateProduct;

/// SIMM risk class of a sensitivity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskClass {
    /// Interest rate
    InterestRate,
    /// Qualifying credit
    CreditQualifying,
    /// Non-qualifying credit
    CreditNonQualifying,
    /// Equity
    Equity,
    /// Commodity
    Commodity,
    /// Foreign exchange
    Fx,
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::InterestRate => "IR",
            Self::CreditQualifying => "CRQ",
            Self::CreditNonQualifying => "CRNQ",
            Self::Equity => "EQ",
            Self::Commodity => "CM",
            Self::Fx => "FX",
        };
        f.write_str(code)
    }
}

/// Identifier of a modelled sensitivity, e.g. `IR:EUR:5Y`.
///
/// Immutable once constructed; usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimmCoordinate {
    risk_class: RiskClass,
    qualifier: String,
    bucket: String,
}

impl SimmCoordinate {
    /// Create a coordinate from its risk class, qualifier (e.g. currency)
    /// and bucket (e.g. tenor label).
    pub fn new(
        risk_class: RiskClass,
        qualifier: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            risk_class,
            qualifier: qualifier.into(),
            bucket: bucket.into(),
        }
    }

    /// The risk class.
    #[inline]
    pub fn risk_class(&self) -> RiskClass {
        self.risk_class
    }

    /// The qualifier, typically a currency code.
    #[inline]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The bucket, typically a tenor label.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl fmt::Display for SimmCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.risk_class, self.qualifier, self.bucket)
    }
}

type ProductFactory = Box<dyn Fn(f64) -> Result<Box<dyn Product>, EvaluationError> + Send + Sync>;

/// A market quantity modelled as a function of the evaluation time.
///
/// Pairs a [`SimmCoordinate`] with a pure factory mapping an evaluation
/// time to the product whose value realises the quantity at that time.
/// The factory holds no mutable state and nothing is cached; each call
/// builds a fresh product.
pub struct ModelledMarketQuantity {
    coordinate: SimmCoordinate,
    factory: ProductFactory,
}

impl ModelledMarketQuantity {
    /// Create a quantity from a coordinate and a product factory.
    pub fn new(
        coordinate: SimmCoordinate,
        factory: impl Fn(f64) -> Result<Box<dyn Product>, EvaluationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            coordinate,
            factory: Box::new(factory),
        }
    }

    /// A par swap rate quantity: at each evaluation time `t`, the par
    /// rate of the swap running from `t` to `t + swap_length` with the
    /// given leg period lengths.
    pub fn swap_rate(
        coordinate: SimmCoordinate,
        swap_length: f64,
        float_period: f64,
        fixed_period: f64,
    ) -> Self {
        Self::new(coordinate, move |evaluation_time| {
            let end = evaluation_time + swap_length;
            let float_leg =
                TimeGrid::new(evaluation_time, end, float_period, StubPlacement::AtEnd)
                    .map_err(SimulationError::from)?;
            let fixed_leg =
                TimeGrid::new(evaluation_time, end, fixed_period, StubPlacement::AtEnd)
                    .map_err(SimulationError::from)?;
            Ok(Box::new(SwapMarketRateProduct::new(float_leg, fixed_leg)) as Box<dyn Product>)
        })
    }

    /// The coordinate identifying this quantity.
    #[inline]
    pub fn coordinate(&self) -> &SimmCoordinate {
        &self.coordinate
    }

    /// Build the product realising this quantity at `evaluation_time`.
    ///
    /// # Errors
    ///
    /// Whatever the factory reports, typically a degenerate schedule.
    pub fn product_at(&self, evaluation_time: f64) -> Result<Box<dyn Product>, EvaluationError> {
        (self.factory)(evaluation_time)
    }

    /// Evaluate this quantity at `evaluation_time` on every path.
    ///
    /// # Errors
    ///
    /// Factory errors, domain errors of the built product, or a wrapped
    /// simulation error.
    pub fn value(
        &self,
        evaluation_time: f64,
        simulation: &LmmSimulation,
    ) -> Result<RandomVariable, EvaluationError> {
        self.product_at(evaluation_time)?
            .value(evaluation_time, simulation)
    }
}

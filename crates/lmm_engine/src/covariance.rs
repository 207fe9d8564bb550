//! Forward-rate covariance models.
//!
//! A covariance model supplies, for each simulation step and each forward
//! rate, a vector of factor loadings: the volatility contributed by each
//! independent Brownian factor. The dot product of two loading vectors is
//! the instantaneous covariance of the corresponding forward rates.

use crate::error::SimulationError;
use lmm_core::{ConfigurationError, TimeGrid, TIME_TOLERANCE};

/// Supplies factor loadings for every `(simulation step, forward rate)`
/// pair of the simulation's time x rate grid.
///
/// Implementations are immutable and shared read-only across paths.
pub trait CovarianceModel: Send + Sync {
    /// Number of independent Brownian factors driving the model.
    fn number_of_factors(&self) -> usize;

    /// Factor loading vector (length [`number_of_factors`]) for forward
    /// rate `component` over simulation step `time_index`.
    ///
    /// Must return the zero vector once the component's fixing time has
    /// passed.
    ///
    /// [`number_of_factors`]: CovarianceModel::number_of_factors
    fn factor_loading(&self, time_index: usize, component: usize) -> Vec<f64>;
}

/// Five-parameter exponential-form covariance model.
///
/// Instantaneous volatility of forward rate `j` at simulation time `t`:
///
/// ```text
/// sigma_j(t) = (a + b * tau) * exp(-c * tau) + d,    tau = T_j - t
/// ```
///
/// and zero once `tau <= 0`. Inter-forward correlation decays
/// exponentially, `rho_jk = exp(-rho * |T_j - T_k|)`, and is reduced to
/// the requested factor count by a truncated, row-renormalised Cholesky
/// decomposition.
///
/// # Examples
///
/// ```
/// use lmm_core::{StubPlacement, TimeGrid};
/// use lmm_engine::{CovarianceModel, ExponentialForm5Param};
///
/// let tenor = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
/// let process = TimeGrid::new(0.0, 5.0, 0.25, StubPlacement::AtEnd).unwrap();
/// let model =
///     ExponentialForm5Param::new(&process, &tenor, 1, [0.1, 0.1, 0.1, 0.1, 0.1]).unwrap();
///
/// assert_eq!(model.number_of_factors(), 1);
/// let loading = model.factor_loading(0, 2);
/// assert_eq!(loading.len(), 1);
/// assert!(loading[0] > 0.0);
/// ```
pub struct ExponentialForm5Param {
    process_times: Vec<f64>,
    tenor_times: Vec<f64>,
    number_of_factors: usize,
    parameters: [f64; 5],
    /// Row `j` holds the unit-norm factor decomposition of component `j`'s
    /// correlation with the others, truncated to `number_of_factors`.
    factor_rows: Vec<Vec<f64>>,
}

impl ExponentialForm5Param {
    /// Build the model for a given simulation grid and period tenor.
    ///
    /// # Arguments
    ///
    /// * `process` - Simulation time grid
    /// * `tenor` - Forward-rate period tenor
    /// * `number_of_factors` - Brownian factors to retain (1..=components)
    /// * `parameters` - `[a, b, c, d, rho]` of the exponential form
    ///
    /// # Errors
    ///
    /// Configuration errors for invalid parameters or factor counts; a
    /// factorisation error if the correlation matrix cannot be decomposed.
    pub fn new(
        process: &TimeGrid,
        tenor: &TimeGrid,
        number_of_factors: usize,
        parameters: [f64; 5],
    ) -> Result<Self, SimulationError> {
        let components = tenor.number_of_steps();
        if number_of_factors == 0 || number_of_factors > components {
            return Err(ConfigurationError::invalid_input(format!(
                "number of factors must lie in [1, {}], got {}",
                components, number_of_factors
            ))
            .into());
        }
        if parameters.iter().any(|p| !p.is_finite()) {
            return Err(ConfigurationError::invalid_input(
                "covariance parameters must be finite",
            )
            .into());
        }
        if parameters[4] < 0.0 {
            return Err(ConfigurationError::invalid_input(
                "correlation decay parameter must be non-negative",
            )
            .into());
        }

        let tenor_times: Vec<f64> = tenor.times().to_vec();
        let correlation_decay = parameters[4];
        let mut correlation = vec![0.0; components * components];
        for j in 0..components {
            for k in 0..components {
                correlation[j * components + k] =
                    (-correlation_decay * (tenor_times[j] - tenor_times[k]).abs()).exp();
            }
        }

        let chol = cholesky_lower(&correlation, components).ok_or_else(|| {
            SimulationError::Factorisation {
                message: "correlation matrix is not positive semidefinite".to_string(),
            }
        })?;

        // Truncate each row to the leading factors and renormalise so the
        // total instantaneous variance of every component is preserved.
        let mut factor_rows = Vec::with_capacity(components);
        for j in 0..components {
            let mut row: Vec<f64> = (0..number_of_factors)
                .map(|k| chol[j * components + k])
                .collect();
            let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                for x in &mut row {
                    *x /= norm;
                }
            } else {
                row[0] = 1.0;
            }
            factor_rows.push(row);
        }

        Ok(Self {
            process_times: process.times().to_vec(),
            tenor_times,
            number_of_factors,
            parameters,
            factor_rows,
        })
    }

    /// The `[a, b, c, d, rho]` parameter vector.
    #[inline]
    pub fn parameters(&self) -> [f64; 5] {
        self.parameters
    }

    /// Instantaneous volatility of component `component` at `time`.
    pub fn volatility(&self, time: f64, component: usize) -> f64 {
        let tau = self.tenor_times[component] - time;
        if tau <= TIME_TOLERANCE {
            return 0.0;
        }
        let [a, b, c, d, _] = self.parameters;
        (a + b * tau) * (-c * tau).exp() + d
    }
}

impl CovarianceModel for ExponentialForm5Param {
    fn number_of_factors(&self) -> usize {
        self.number_of_factors
    }

    fn factor_loading(&self, time_index: usize, component: usize) -> Vec<f64> {
        let vol = self.volatility(self.process_times[time_index], component);
        self.factor_rows[component].iter().map(|f| vol * f).collect()
    }
}

/// Lower-triangular Cholesky factor of a symmetric matrix stored row-major.
///
/// Diagonal terms slightly below zero (within `tol`) are clamped to keep
/// numerically semidefinite correlation matrices decomposable.
fn cholesky_lower(matrix: &[f64], n: usize) -> Option<Vec<f64>> {
    let tol = 1.0e-12;
    let mut l = vec![0.0; n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i * n + j];
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }
            if i == j {
                if sum < -tol {
                    return None;
                }
                l[i * n + j] = sum.max(tol).sqrt();
            } else if l[j * n + j].abs() > tol {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }
    Some(l)
}

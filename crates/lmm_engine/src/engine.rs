//! Lazy, step-cached LIBOR market model simulation.
//!
//! The engine evolves the full vector of forward rates under the discrete
//! spot measure with a log-Euler scheme (optionally predictor-corrector
//! drift averaging). Nothing is simulated at construction: the first
//! query triggers evolution up to the requested step, and every computed
//! step is cached as an immutable snapshot shared by later queries.
//!
//! Within a step all paths evolve in parallel. Reproducibility is
//! unaffected by the parallelism because each path consumes its own
//! pre-generated increment stream from [`BrownianMotion`].

use std::sync::{Arc, RwLock};

use lmm_core::{
    ConfigurationError, DiscountCurve, ForwardCurve, RandomVariable, TimeGrid, TIME_TOLERANCE,
};
use rayon::prelude::*;

use crate::brownian::BrownianMotion;
use crate::covariance::CovarianceModel;
use crate::error::SimulationError;

/// Time-stepping scheme for the forward-rate drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscretisationScheme {
    /// Log-Euler with the drift evaluated at the step start.
    #[default]
    Euler,
    /// Log-Euler with the drift averaged between the step start and the
    /// Euler-predicted step end. Tighter for coarse grids.
    PredictorCorrector,
}

/// Configuration of an [`LmmSimulation`].
///
/// Assembled through [`LmmConfig::builder`]; cross-field consistency is
/// verified by [`LmmSimulation::new`].
pub struct LmmConfig {
    tenor: TimeGrid,
    process: TimeGrid,
    forward_curve: ForwardCurve<f64>,
    discount_curve: DiscountCurve<f64>,
    covariance: Arc<dyn CovarianceModel>,
    brownian: BrownianMotion,
    scheme: DiscretisationScheme,
}

impl LmmConfig {
    /// Start assembling a configuration.
    pub fn builder() -> LmmConfigBuilder {
        LmmConfigBuilder::default()
    }
}

/// Builder for [`LmmConfig`].
#[derive(Default)]
pub struct LmmConfigBuilder {
    tenor: Option<TimeGrid>,
    process: Option<TimeGrid>,
    forward_curve: Option<ForwardCurve<f64>>,
    discount_curve: Option<DiscountCurve<f64>>,
    covariance: Option<Arc<dyn CovarianceModel>>,
    brownian: Option<BrownianMotion>,
    scheme: DiscretisationScheme,
}

impl LmmConfigBuilder {
    /// Forward-rate period tenor (fixing and payment dates).
    pub fn tenor(mut self, tenor: TimeGrid) -> Self {
        self.tenor = Some(tenor);
        self
    }

    /// Simulation time discretisation. Must contain every tenor point.
    pub fn process(mut self, process: TimeGrid) -> Self {
        self.process = Some(process);
        self
    }

    /// Initial forward curve the paths start from.
    pub fn forward_curve(mut self, curve: ForwardCurve<f64>) -> Self {
        self.forward_curve = Some(curve);
        self
    }

    /// Discount curve the numeraire is adjusted onto.
    pub fn discount_curve(mut self, curve: DiscountCurve<f64>) -> Self {
        self.discount_curve = Some(curve);
        self
    }

    /// Covariance model supplying factor loadings.
    pub fn covariance(mut self, model: impl CovarianceModel + 'static) -> Self {
        self.covariance = Some(Arc::new(model));
        self
    }

    /// Pre-generated Brownian increments on the process grid.
    pub fn brownian(mut self, brownian: BrownianMotion) -> Self {
        self.brownian = Some(brownian);
        self
    }

    /// Time-stepping scheme. Defaults to [`DiscretisationScheme::Euler`].
    pub fn scheme(mut self, scheme: DiscretisationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Finalise the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when a required component is
    /// missing.
    pub fn build(self) -> Result<LmmConfig, ConfigurationError> {
        let missing = |what: &str| {
            ConfigurationError::invalid_input(format!("simulation config is missing {what}"))
        };
        Ok(LmmConfig {
            tenor: self.tenor.ok_or_else(|| missing("a tenor grid"))?,
            process: self.process.ok_or_else(|| missing("a process grid"))?,
            forward_curve: self
                .forward_curve
                .ok_or_else(|| missing("a forward curve"))?,
            discount_curve: self
                .discount_curve
                .ok_or_else(|| missing("a discount curve"))?,
            covariance: self
                .covariance
                .ok_or_else(|| missing("a covariance model"))?,
            brownian: self
                .brownian
                .ok_or_else(|| missing("a Brownian generator"))?,
            scheme: self.scheme,
        })
    }
}

/// Immutable snapshot of one simulated time point.
///
/// Forward rates are stored flat as `[path][component]`; the numeraire
/// carries the discount-curve adjustment already applied.
pub struct StepState {
    time: f64,
    components: usize,
    forwards: Vec<f64>,
    numeraire: Vec<f64>,
}

impl StepState {
    /// Simulation time of this snapshot.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Forward-rate vector of path `path`.
    #[inline]
    pub fn forwards(&self, path: usize) -> &[f64] {
        let offset = path * self.components;
        &self.forwards[offset..offset + self.components]
    }

    /// Forward rate of component `component` on path `path`.
    #[inline]
    pub fn forward(&self, path: usize, component: usize) -> f64 {
        self.forwards[path * self.components + component]
    }

    /// Adjusted numeraire realisation on path `path`.
    #[inline]
    pub fn numeraire(&self, path: usize) -> f64 {
        self.numeraire[path]
    }

    /// Adjusted numeraire realisations of all paths.
    #[inline]
    pub fn numeraires(&self) -> &[f64] {
        &self.numeraire
    }
}

/// Monte Carlo LIBOR market model simulation.
///
/// # Examples
///
/// ```
/// use lmm_core::{DiscountCurve, ForwardCurve, StubPlacement, TimeGrid};
/// use lmm_engine::{BrownianMotion, ExponentialForm5Param, LmmConfig, LmmSimulation};
///
/// let tenor = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
/// let process = tenor.union(&TimeGrid::new(0.0, 5.0, 0.5, StubPlacement::AtEnd).unwrap());
///
/// let forward_curve = ForwardCurve::from_forwards(
///     "EUR-12M",
///     vec![0.0, 1.0, 2.0, 3.0, 4.0],
///     vec![0.01, 0.03, 0.025, 0.02, 0.015],
///     1.0,
/// )
/// .unwrap();
/// let discount_curve = DiscountCurve::from_discount_factors(
///     "EUR-OIS",
///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
///     vec![0.98, 0.95, 0.94, 0.92, 0.9],
/// )
/// .unwrap();
///
/// let covariance =
///     ExponentialForm5Param::new(&process, &tenor, 1, [0.1, 0.1, 0.1, 0.1, 0.1]).unwrap();
/// let brownian = BrownianMotion::new(&process, 1, 100, 42).unwrap();
///
/// let config = LmmConfig::builder()
///     .tenor(tenor)
///     .process(process)
///     .forward_curve(forward_curve)
///     .discount_curve(discount_curve)
///     .covariance(covariance)
///     .brownian(brownian)
///     .build()
///     .unwrap();
///
/// let simulation = LmmSimulation::new(config).unwrap();
/// let par_forward = simulation.forward_rate(0.0, 1.0, 2.0).unwrap();
/// assert_eq!(par_forward.number_of_paths(), 100);
/// ```
pub struct LmmSimulation {
    tenor: TimeGrid,
    process: TimeGrid,
    discount_curve: DiscountCurve<f64>,
    covariance: Arc<dyn CovarianceModel>,
    brownian: BrownianMotion,
    scheme: DiscretisationScheme,
    components: usize,
    /// Tenor period lengths, `periods[j] = T_{j+1} - T_j`.
    periods: Vec<f64>,
    /// Computed snapshots, extended forward-only under the write lock.
    steps: RwLock<Vec<Arc<StepState>>>,
}

impl LmmSimulation {
    /// Validate the configuration and set up the initial state.
    ///
    /// No path evolution happens here; simulation is performed lazily by
    /// the query methods.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the covariance model and the
    /// Brownian generator disagree on factor counts, the process grid
    /// does not contain the tenor grid, the grids do not start at time 0,
    /// or the Brownian generator was built on a different grid.
    pub fn new(config: LmmConfig) -> Result<Self, SimulationError> {
        let LmmConfig {
            tenor,
            process,
            forward_curve,
            discount_curve,
            covariance,
            brownian,
            scheme,
        } = config;

        if covariance.number_of_factors() != brownian.number_of_factors() {
            return Err(ConfigurationError::FactorCountMismatch {
                covariance: covariance.number_of_factors(),
                generator: brownian.number_of_factors(),
            }
            .into());
        }
        if brownian.number_of_steps() != process.number_of_steps() {
            return Err(ConfigurationError::invalid_input(format!(
                "Brownian generator covers {} steps but the process grid has {}",
                brownian.number_of_steps(),
                process.number_of_steps()
            ))
            .into());
        }
        if process.first_time().abs() > TIME_TOLERANCE {
            return Err(ConfigurationError::invalid_input(
                "process grid must start at time 0",
            )
            .into());
        }
        for &t in tenor.times() {
            if process.index_of(t).is_none() {
                return Err(ConfigurationError::MissingGridPoint { time: t }.into());
            }
        }

        let components = tenor.number_of_steps();
        let periods: Vec<f64> = (0..components).map(|j| tenor.time_step(j)).collect();
        let number_of_paths = brownian.number_of_paths();

        // Deterministic time-0 snapshot from the initial curves.
        let initial: Vec<f64> = (0..components)
            .map(|j| forward_curve.forward(tenor.time_at(j)))
            .collect();
        for (j, rate) in initial.iter().enumerate() {
            if !rate.is_finite() {
                return Err(ConfigurationError::InvalidPillarValue {
                    time: tenor.time_at(j),
                    value: *rate,
                    constraint: "initial forward rate must be finite",
                }
                .into());
            }
        }
        let mut forwards = Vec::with_capacity(number_of_paths * components);
        for _ in 0..number_of_paths {
            forwards.extend_from_slice(&initial);
        }
        let step0 = Arc::new(StepState {
            time: process.first_time(),
            components,
            forwards,
            numeraire: vec![1.0; number_of_paths],
        });

        Ok(Self {
            tenor,
            process,
            discount_curve,
            covariance,
            brownian,
            scheme,
            components,
            periods,
            steps: RwLock::new(vec![step0]),
        })
    }

    /// Number of simulated paths.
    #[inline]
    pub fn number_of_paths(&self) -> usize {
        self.brownian.number_of_paths()
    }

    /// The forward-rate period tenor.
    #[inline]
    pub fn tenor(&self) -> &TimeGrid {
        &self.tenor
    }

    /// The simulation time discretisation.
    #[inline]
    pub fn process(&self) -> &TimeGrid {
        &self.process
    }

    /// The discount curve the numeraire reproduces in expectation.
    #[inline]
    pub fn discount_curve(&self) -> &DiscountCurve<f64> {
        &self.discount_curve
    }

    /// The configured time-stepping scheme.
    #[inline]
    pub fn scheme(&self) -> DiscretisationScheme {
        self.scheme
    }

    /// Snapshot of process-grid step `step`, simulating forward as needed.
    ///
    /// Concurrent callers share cached snapshots; at most one caller at a
    /// time extends the cache.
    ///
    /// # Errors
    ///
    /// A configuration error for steps beyond the grid, or a numerical
    /// failure raised while evolving.
    pub fn state_at(&self, step: usize) -> Result<Arc<StepState>, SimulationError> {
        if step >= self.process.number_of_times() {
            return Err(ConfigurationError::invalid_input(format!(
                "step {} lies beyond the process grid (last step is {})",
                step,
                self.process.number_of_steps()
            ))
            .into());
        }

        {
            let steps = self.steps.read().expect("simulation step cache poisoned");
            if let Some(state) = steps.get(step) {
                return Ok(Arc::clone(state));
            }
        }

        let mut steps = self.steps.write().expect("simulation step cache poisoned");
        while steps.len() <= step {
            let next = self.evolve_step(steps.last().expect("initial state always present"))?;
            steps.push(Arc::new(next));
        }
        Ok(Arc::clone(&steps[step]))
    }

    /// Snapshot at simulation time `time` (largest grid point `<= time`).
    fn state_at_time(&self, time: f64) -> Result<Arc<StepState>, SimulationError> {
        if time > self.process.last_time() + TIME_TOLERANCE {
            return Err(SimulationError::TimeOutOfRange {
                time,
                horizon: self.process.last_time(),
            });
        }
        let step = self
            .process
            .lower_index(time)
            .ok_or(SimulationError::TimeOutOfRange {
                time,
                horizon: self.process.last_time(),
            })?;
        self.state_at(step)
    }

    /// The adjusted numeraire observed at `time`, one value per path.
    ///
    /// `time` is mapped to the largest process-grid point not after it.
    ///
    /// # Errors
    ///
    /// [`SimulationError::TimeOutOfRange`] outside the simulated horizon,
    /// or a numerical failure raised while evolving.
    pub fn numeraire(&self, time: f64) -> Result<RandomVariable, SimulationError> {
        let state = self.state_at_time(time)?;
        Ok(RandomVariable::new(time, state.numeraires().to_vec()))
    }

    /// The zero-coupon bond `P(time, maturity)` implied by each path's
    /// forward vector.
    ///
    /// Partial tenor periods accrue pro rata with the period's forward.
    ///
    /// # Errors
    ///
    /// Configuration error when `maturity < time`; time-out-of-range when
    /// either time lies outside the tenor span.
    pub fn zero_coupon_bond(
        &self,
        time: f64,
        maturity: f64,
    ) -> Result<RandomVariable, SimulationError> {
        if maturity < time - TIME_TOLERANCE {
            return Err(ConfigurationError::invalid_input(format!(
                "bond maturity {maturity} lies before observation time {time}"
            ))
            .into());
        }
        if maturity > self.tenor.last_time() + TIME_TOLERANCE {
            return Err(SimulationError::TimeOutOfRange {
                time: maturity,
                horizon: self.tenor.last_time(),
            });
        }

        let state = self.state_at_time(time)?;
        let values = (0..self.number_of_paths())
            .map(|path| self.bond_on_path(&state, path, time, maturity))
            .collect();
        Ok(RandomVariable::new(time, values))
    }

    /// The simple forward rate for `[period_start, period_end]` observed
    /// at `time`, one value per path.
    ///
    /// Computed from the path's zero-coupon bonds,
    /// `(P(t, start) / P(t, end) - 1) / (end - start)`.
    ///
    /// # Errors
    ///
    /// Configuration error for a degenerate period; time-out-of-range
    /// when the period extends beyond the tenor span.
    pub fn forward_rate(
        &self,
        time: f64,
        period_start: f64,
        period_end: f64,
    ) -> Result<RandomVariable, SimulationError> {
        if period_end <= period_start + TIME_TOLERANCE {
            return Err(ConfigurationError::InvalidPeriod {
                start: period_start,
                end: period_end,
                period_length: period_end - period_start,
            }
            .into());
        }
        if period_end > self.tenor.last_time() + TIME_TOLERANCE {
            return Err(SimulationError::TimeOutOfRange {
                time: period_end,
                horizon: self.tenor.last_time(),
            });
        }

        let state = self.state_at_time(time)?;
        let accrual = period_end - period_start;
        let values = (0..self.number_of_paths())
            .map(|path| {
                let bond_start = self.bond_on_path(&state, path, time, period_start.max(time));
                let bond_end = self.bond_on_path(&state, path, time, period_end);
                (bond_start / bond_end - 1.0) / accrual
            })
            .collect();
        Ok(RandomVariable::new(time, values))
    }

    /// `P(time, maturity)` on a single path from its forward vector.
    fn bond_on_path(&self, state: &StepState, path: usize, time: f64, maturity: f64) -> f64 {
        let forwards = state.forwards(path);
        let mut bond = 1.0;
        for j in 0..self.components {
            let period_start = self.tenor.time_at(j);
            let period_end = self.tenor.time_at(j + 1);
            let overlap = period_end.min(maturity) - period_start.max(time);
            if overlap > TIME_TOLERANCE {
                bond /= 1.0 + forwards[j] * overlap;
            }
        }
        bond
    }

    /// Evolve every path over one process step.
    fn evolve_step(&self, previous: &StepState) -> Result<StepState, SimulationError> {
        let step = self
            .process
            .index_of(previous.time)
            .expect("cached state lies on the process grid");
        let time = previous.time;
        let next_time = self.process.time_at(step + 1);
        let dt = next_time - time;
        let components = self.components;
        let factors = self.brownian.number_of_factors();

        // Loadings depend on (step, component) only; lift them out of the
        // per-path loop.
        let loadings: Vec<Vec<f64>> = (0..components)
            .map(|j| self.covariance.factor_loading(step, j))
            .collect();
        let variances: Vec<f64> = loadings
            .iter()
            .map(|lam| lam.iter().map(|x| x * x).sum())
            .collect();
        let alive: Vec<bool> = (0..components)
            .map(|j| self.tenor.time_at(j) > time + TIME_TOLERANCE)
            .collect();

        let mut forwards = vec![0.0; self.number_of_paths() * components];
        forwards
            .par_chunks_mut(components)
            .enumerate()
            .try_for_each(|(path, next)| -> Result<(), SimulationError> {
                let current = previous.forwards(path);
                let increments = self.brownian.increments_at(path, step);

                let drift_start =
                    spot_measure_drifts(&loadings, &self.periods, current, &alive, factors);

                // Euler-predicted end point.
                for j in 0..components {
                    if alive[j] {
                        let exponent = (drift_start[j] - 0.5 * variances[j]) * dt
                            + dot(&loadings[j], increments);
                        next[j] = current[j] * exponent.exp();
                    } else {
                        next[j] = current[j];
                    }
                }

                if self.scheme == DiscretisationScheme::PredictorCorrector {
                    let drift_end =
                        spot_measure_drifts(&loadings, &self.periods, next, &alive, factors);
                    for j in 0..components {
                        if alive[j] {
                            let drift = 0.5 * (drift_start[j] + drift_end[j]);
                            let exponent = (drift - 0.5 * variances[j]) * dt
                                + dot(&loadings[j], increments);
                            next[j] = current[j] * exponent.exp();
                        }
                    }
                }

                for (j, rate) in next.iter().enumerate() {
                    if !rate.is_finite() || *rate <= 0.0 {
                        return Err(SimulationError::numerical(
                            step + 1,
                            next_time,
                            path,
                            format!("forward rate {j} evolved to {rate}"),
                        ));
                    }
                }
                Ok(())
            })?;

        let numeraire = self.accrue_numeraire(previous, step, next_time)?;

        Ok(StepState {
            time: next_time,
            components,
            forwards,
            numeraire,
        })
    }

    /// Accrue the spot-measure bank account over `[previous.time,
    /// next_time]` and pin its inverse mean onto the discount curve.
    fn accrue_numeraire(
        &self,
        previous: &StepState,
        step: usize,
        next_time: f64,
    ) -> Result<Vec<f64>, SimulationError> {
        let time = previous.time;
        // Tenor points are process points, so a single tenor period covers
        // the whole step.
        let eta = self
            .tenor
            .lower_index(time)
            .expect("process grid starts at the first tenor point")
            .min(self.components - 1);
        let period_start = self.tenor.time_at(eta);

        let mut numeraire = Vec::with_capacity(self.number_of_paths());
        let mut inverse_sum = 0.0;
        for path in 0..self.number_of_paths() {
            // Fixed at the period start, identical in both snapshots.
            let rate = previous.forward(path, eta);
            let accrual = (1.0 + rate * (next_time - period_start))
                / (1.0 + rate * (time - period_start));
            let value = previous.numeraire(path) * accrual;
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::numerical(
                    step + 1,
                    next_time,
                    path,
                    format!("numeraire evolved to {value}"),
                ));
            }
            inverse_sum += 1.0 / value;
            numeraire.push(value);
        }

        // Deterministic adjustment: after scaling, the cross-path mean of
        // 1/N(t) equals the discount factor exactly.
        let mean_inverse = inverse_sum / self.number_of_paths() as f64;
        let target = self.discount_curve.discount_factor(next_time);
        let scale = mean_inverse / target;
        for value in &mut numeraire {
            *value *= scale;
        }
        Ok(numeraire)
    }
}

/// Discrete spot-measure drifts for every component at one time step.
///
/// `mu_j = lambda_j . sum_{k <= j} lambda_k * tau_k L_k / (1 + tau_k L_k)`,
/// accumulated with a running factor sum. Dead components carry zero
/// loadings and so contribute nothing.
fn spot_measure_drifts(
    loadings: &[Vec<f64>],
    periods: &[f64],
    forwards: &[f64],
    alive: &[bool],
    factors: usize,
) -> Vec<f64> {
    let components = loadings.len();
    let mut factor_sum = vec![0.0; factors];
    let mut drifts = vec![0.0; components];
    for j in 0..components {
        let weight = periods[j] * forwards[j] / (1.0 + periods[j] * forwards[j]);
        for (sum, lam) in factor_sum.iter_mut().zip(&loadings[j]) {
            *sum += lam * weight;
        }
        if alive[j] {
            drifts[j] = dot(&loadings[j], &factor_sum);
        }
    }
    drifts
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::ExponentialForm5Param;
    use approx::assert_relative_eq;
    use lmm_core::StubPlacement;

    const FORWARDS: [f64; 5] = [0.01, 0.03, 0.025, 0.02, 0.015];
    const DISCOUNT_FACTORS: [f64; 5] = [0.98, 0.95, 0.94, 0.92, 0.9];

    fn build_simulation(
        paths: usize,
        seed: u64,
        covariance_factors: usize,
        brownian_factors: usize,
        scheme: DiscretisationScheme,
    ) -> Result<LmmSimulation, SimulationError> {
        let tenor = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
        let fine = TimeGrid::new(0.0, 5.0, 0.25, StubPlacement::AtEnd).unwrap();
        let process = tenor.union(&fine);

        let forward_curve = ForwardCurve::from_forwards(
            "EUR-12M",
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            FORWARDS.to_vec(),
            1.0,
        )
        .unwrap();
        let discount_curve = DiscountCurve::from_discount_factors(
            "EUR-OIS",
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            DISCOUNT_FACTORS.to_vec(),
        )
        .unwrap();

        let covariance = ExponentialForm5Param::new(
            &process,
            &tenor,
            covariance_factors,
            [0.1, 0.1, 0.1, 0.1, 0.1],
        )?;
        let brownian = BrownianMotion::new(&process, brownian_factors, paths, seed)?;

        let config = LmmConfig::builder()
            .tenor(tenor)
            .process(process)
            .forward_curve(forward_curve)
            .discount_curve(discount_curve)
            .covariance(covariance)
            .brownian(brownian)
            .scheme(scheme)
            .build()?;
        LmmSimulation::new(config)
    }

    #[test]
    fn test_initial_state_reproduces_forward_curve() {
        let sim = build_simulation(10, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let state = sim.state_at(0).unwrap();
        for path in 0..10 {
            for (j, expected) in FORWARDS.iter().enumerate() {
                assert_relative_eq!(state.forward(path, j), *expected);
            }
            assert_relative_eq!(state.numeraire(path), 1.0);
        }
    }

    #[test]
    fn test_factor_count_mismatch_fails_fast() {
        let err = build_simulation(10, 42, 2, 1, DiscretisationScheme::Euler)
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            SimulationError::Configuration(ConfigurationError::FactorCountMismatch {
                covariance: 2,
                generator: 1,
            })
        ));
    }

    #[test]
    fn test_identical_seeds_reproduce_identical_paths() {
        let a = build_simulation(200, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let b = build_simulation(200, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let last = a.process().number_of_steps();
        let state_a = a.state_at(last).unwrap();
        let state_b = b.state_at(last).unwrap();
        for path in 0..200 {
            assert_eq!(state_a.forwards(path), state_b.forwards(path));
            assert_eq!(state_a.numeraire(path), state_b.numeraire(path));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = build_simulation(50, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let b = build_simulation(50, 43, 1, 1, DiscretisationScheme::Euler).unwrap();
        let state_a = a.state_at(4).unwrap();
        let state_b = b.state_at(4).unwrap();
        assert_ne!(state_a.forward(0, 3), state_b.forward(0, 3));
    }

    #[test]
    fn test_components_freeze_at_their_fixing_times() {
        let sim = build_simulation(50, 7, 1, 1, DiscretisationScheme::Euler).unwrap();
        // Component 1 fixes at T = 1.0. Locate that step and compare with
        // the horizon.
        let fixing_step = sim.process().index_of(1.0).unwrap();
        let at_fixing = sim.state_at(fixing_step).unwrap();
        let at_horizon = sim.state_at(sim.process().number_of_steps()).unwrap();
        for path in 0..50 {
            assert_eq!(at_fixing.forward(path, 0), at_horizon.forward(path, 0));
            assert_eq!(at_fixing.forward(path, 1), at_horizon.forward(path, 1));
            assert_ne!(at_fixing.forward(path, 4), at_horizon.forward(path, 4));
        }
    }

    #[test]
    fn test_numeraire_inverse_mean_matches_discount_curve() {
        let sim = build_simulation(500, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        for (maturity, df) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().zip(&DISCOUNT_FACTORS) {
            let numeraire = sim.numeraire(*maturity).unwrap();
            let mean_inverse = numeraire.values().iter().map(|n| 1.0 / n).sum::<f64>()
                / numeraire.number_of_paths() as f64;
            assert_relative_eq!(mean_inverse, *df, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_initial_bond_matches_forward_product() {
        let sim = build_simulation(10, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let bond = sim.zero_coupon_bond(0.0, 2.0).unwrap();
        let expected = 1.0 / ((1.0 + FORWARDS[0]) * (1.0 + FORWARDS[1]));
        for path in 0..10 {
            assert_relative_eq!(bond.get(path), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_initial_forward_rate_reproduces_curve() {
        let sim = build_simulation(10, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let rate = sim.forward_rate(0.0, 2.0, 3.0).unwrap();
        for path in 0..10 {
            assert_relative_eq!(rate.get(path), FORWARDS[2], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_step_indices_beyond_the_grid_are_rejected() {
        let sim = build_simulation(10, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let last_step = sim.process().number_of_steps();
        assert!(sim.state_at(last_step).is_ok());
        let err = sim.state_at(last_step + 1).err().unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(&format!("last step is {last_step}")));
    }

    #[test]
    fn test_queries_outside_horizon_fail() {
        let sim = build_simulation(10, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        assert!(matches!(
            sim.numeraire(6.0),
            Err(SimulationError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            sim.forward_rate(0.0, 5.0, 6.0),
            Err(SimulationError::TimeOutOfRange { .. })
        ));
        assert!(sim.forward_rate(0.0, 2.0, 2.0).is_err());
    }

    #[test]
    fn test_predictor_corrector_stays_close_to_euler() {
        let euler = build_simulation(200, 42, 1, 1, DiscretisationScheme::Euler).unwrap();
        let pc =
            build_simulation(200, 42, 1, 1, DiscretisationScheme::PredictorCorrector).unwrap();
        let last = euler.process().number_of_steps();
        let state_e = euler.state_at(last).unwrap();
        let state_p = pc.state_at(last).unwrap();
        for path in 0..200 {
            let rate_e = state_e.forward(path, 4);
            let rate_p = state_p.forward(path, 4);
            assert_relative_eq!(rate_e, rate_p, max_relative = 0.05);
        }
    }

    #[test]
    fn test_missing_tenor_point_in_process_grid_is_rejected() {
        let tenor = TimeGrid::new(0.0, 5.0, 1.0, StubPlacement::AtEnd).unwrap();
        let process = TimeGrid::new(0.0, 5.0, 2.5, StubPlacement::AtEnd).unwrap();
        let forward_curve =
            ForwardCurve::from_forwards("F", vec![0.0, 4.0], vec![0.02, 0.02], 1.0).unwrap();
        let discount_curve =
            DiscountCurve::from_discount_factors("D", vec![5.0], vec![0.9]).unwrap();
        let covariance =
            ExponentialForm5Param::new(&process, &tenor, 1, [0.1; 5]).unwrap();
        let brownian = BrownianMotion::new(&process, 1, 10, 42).unwrap();
        let config = LmmConfig::builder()
            .tenor(tenor)
            .process(process)
            .forward_curve(forward_curve)
            .discount_curve(discount_curve)
            .covariance(covariance)
            .brownian(brownian)
            .build()
            .unwrap();
        let err = LmmSimulation::new(config).err().unwrap();
        assert!(matches!(
            err,
            SimulationError::Configuration(ConfigurationError::MissingGridPoint { .. })
        ));
    }
}

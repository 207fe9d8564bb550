//! Multi-factor Brownian increment generation.
//!
//! Increments are pre-generated at construction, one independent stream
//! per path, so that the draws a path receives depend only on the master
//! seed and the path index. Parallel scheduling can therefore never
//! change a result.

use lmm_core::{ConfigurationError, TimeGrid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::error::SimulationError;

/// Pre-generated Brownian increments on a time grid.
///
/// For path `p`, step `i` and factor `f`, [`increment`] returns a draw
/// from `N(0, dt_i)` where `dt_i` is the length of step `i`. Factors are
/// mutually independent; correlation between forward rates is applied by
/// the covariance model's factor loadings, not here.
///
/// [`increment`]: BrownianMotion::increment
///
/// # Examples
///
/// ```
/// use lmm_core::{StubPlacement, TimeGrid};
/// use lmm_engine::BrownianMotion;
///
/// let grid = TimeGrid::new(0.0, 1.0, 0.25, StubPlacement::AtEnd).unwrap();
/// let brownian = BrownianMotion::new(&grid, 2, 100, 42).unwrap();
///
/// assert_eq!(brownian.number_of_factors(), 2);
/// assert_eq!(brownian.number_of_paths(), 100);
/// let dw = brownian.increments_at(7, 0);
/// assert_eq!(dw.len(), 2);
/// ```
pub struct BrownianMotion {
    number_of_factors: usize,
    number_of_paths: usize,
    number_of_steps: usize,
    seed: u64,
    /// Flat layout `[path][step][factor]`, so one path's draws are
    /// contiguous and can be filled by an independent stream.
    increments: Vec<f64>,
}

impl BrownianMotion {
    /// Generate increments for every `(path, step, factor)` triple.
    ///
    /// # Arguments
    ///
    /// * `time_grid` - Simulation discretisation supplying the step sizes
    /// * `number_of_factors` - Independent factors per step
    /// * `number_of_paths` - Monte Carlo paths
    /// * `seed` - Master seed; identical inputs reproduce identical draws
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `number_of_factors` or
    /// `number_of_paths` is zero.
    pub fn new(
        time_grid: &TimeGrid,
        number_of_factors: usize,
        number_of_paths: usize,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        if number_of_factors == 0 {
            return Err(
                ConfigurationError::invalid_input("number of factors must be positive").into(),
            );
        }
        if number_of_paths == 0 {
            return Err(
                ConfigurationError::invalid_input("number of paths must be positive").into(),
            );
        }

        let number_of_steps = time_grid.number_of_steps();
        let sqrt_dts: Vec<f64> = (0..number_of_steps)
            .map(|i| time_grid.time_step(i).sqrt())
            .collect();

        let draws_per_path = number_of_steps * number_of_factors;
        let mut increments = vec![0.0; number_of_paths * draws_per_path];
        increments
            .par_chunks_mut(draws_per_path)
            .enumerate()
            .for_each(|(path, chunk)| {
                let mut rng = StdRng::seed_from_u64(path_seed(seed, path as u64));
                for step in 0..number_of_steps {
                    let sqrt_dt = sqrt_dts[step];
                    for factor in 0..number_of_factors {
                        let z: f64 = rng.sample(StandardNormal);
                        chunk[step * number_of_factors + factor] = z * sqrt_dt;
                    }
                }
            });

        Ok(Self {
            number_of_factors,
            number_of_paths,
            number_of_steps,
            seed,
            increments,
        })
    }

    /// Number of independent factors.
    #[inline]
    pub fn number_of_factors(&self) -> usize {
        self.number_of_factors
    }

    /// Number of simulated paths.
    #[inline]
    pub fn number_of_paths(&self) -> usize {
        self.number_of_paths
    }

    /// Number of time steps.
    #[inline]
    pub fn number_of_steps(&self) -> usize {
        self.number_of_steps
    }

    /// The master seed the increments were generated from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The increment of factor `factor` on path `path` over step `step`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    #[inline]
    pub fn increment(&self, path: usize, step: usize, factor: usize) -> f64 {
        self.increments
            [(path * self.number_of_steps + step) * self.number_of_factors + factor]
    }

    /// All factor increments of path `path` over step `step`.
    ///
    /// # Panics
    ///
    /// Panics if `path` or `step` is out of range.
    #[inline]
    pub fn increments_at(&self, path: usize, step: usize) -> &[f64] {
        let offset = (path * self.number_of_steps + step) * self.number_of_factors;
        &self.increments[offset..offset + self.number_of_factors]
    }
}

/// Derive a per-path stream seed from the master seed.
///
/// SplitMix64 finalisation over `seed + path`, so neighbouring path
/// indices land on uncorrelated stream seeds.
fn path_seed(seed: u64, path: u64) -> u64 {
    let mut z = seed
        .wrapping_add(path.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lmm_core::StubPlacement;

    fn grid() -> TimeGrid {
        TimeGrid::new(0.0, 2.0, 0.5, StubPlacement::AtEnd).unwrap()
    }

    #[test]
    fn test_same_seed_reproduces_draws() {
        let a = BrownianMotion::new(&grid(), 2, 50, 42).unwrap();
        let b = BrownianMotion::new(&grid(), 2, 50, 42).unwrap();
        for path in 0..50 {
            for step in 0..4 {
                assert_eq!(a.increments_at(path, step), b.increments_at(path, step));
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = BrownianMotion::new(&grid(), 1, 10, 42).unwrap();
        let b = BrownianMotion::new(&grid(), 1, 10, 43).unwrap();
        assert_ne!(a.increment(0, 0, 0), b.increment(0, 0, 0));
    }

    #[test]
    fn test_path_draws_independent_of_path_count() {
        // Adding paths must not disturb the draws of existing paths.
        let small = BrownianMotion::new(&grid(), 2, 10, 7).unwrap();
        let large = BrownianMotion::new(&grid(), 2, 1000, 7).unwrap();
        for path in 0..10 {
            for step in 0..4 {
                assert_eq!(
                    small.increments_at(path, step),
                    large.increments_at(path, step)
                );
            }
        }
    }

    #[test]
    fn test_increment_moments() {
        let grid = TimeGrid::new(0.0, 1.0, 0.25, StubPlacement::AtEnd).unwrap();
        let brownian = BrownianMotion::new(&grid, 1, 100_000, 1234).unwrap();
        let n = brownian.number_of_paths();
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for path in 0..n {
            let dw = brownian.increment(path, 0, 0);
            sum += dw;
            sum_sq += dw * dw;
        }
        let mean = sum / n as f64;
        let var = sum_sq / n as f64 - mean * mean;
        assert_relative_eq!(mean, 0.0, epsilon = 5e-3);
        assert_relative_eq!(var, 0.25, epsilon = 5e-3);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(BrownianMotion::new(&grid(), 0, 10, 42).is_err());
        assert!(BrownianMotion::new(&grid(), 1, 0, 42).is_err());
    }
}

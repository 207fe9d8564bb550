//! Path-indexed scalar random variables.
//!
//! A [`RandomVariable`] is the result type every path-wise evaluator
//! reports: one scalar per simulated path, tagged with the time the
//! quantity refers to. The full path set is retained so downstream
//! sensitivity aggregation can weight paths itself.

/// One scalar per simulated path, observed at a fixed time.
///
/// # Examples
///
/// ```
/// use lmm_core::RandomVariable;
///
/// let rv = RandomVariable::new(1.0, vec![0.02, 0.04]);
/// assert_eq!(rv.number_of_paths(), 2);
/// assert_eq!(rv.average(), 0.03);
/// assert_eq!(rv.get(1), 0.04);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RandomVariable {
    time: f64,
    values: Vec<f64>,
}

impl RandomVariable {
    /// Create a random variable from its per-path realisations.
    pub fn new(time: f64, values: Vec<f64>) -> Self {
        Self { time, values }
    }

    /// A deterministic value replicated across `number_of_paths` paths.
    pub fn constant(time: f64, value: f64, number_of_paths: usize) -> Self {
        Self {
            time,
            values: vec![value; number_of_paths],
        }
    }

    /// The observation time of this quantity.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Realisation on path `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is out of range.
    #[inline]
    pub fn get(&self, path: usize) -> f64 {
        self.values[path]
    }

    /// All per-path realisations.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of paths.
    #[inline]
    pub fn number_of_paths(&self) -> usize {
        self.values.len()
    }

    /// Equally-weighted path average.
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Sample variance across paths (population convention).
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.average();
        self.values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
            / self.values.len() as f64
    }

    /// Standard error of the path average.
    pub fn standard_error(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        (self.variance() / self.values.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_and_variance() {
        let rv = RandomVariable::new(0.0, vec![1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(rv.average(), 2.5);
        assert_relative_eq!(rv.variance(), 1.25);
        assert_relative_eq!(rv.standard_error(), (1.25_f64 / 4.0).sqrt());
    }

    #[test]
    fn test_constant() {
        let rv = RandomVariable::constant(2.0, 0.03, 5);
        assert_eq!(rv.number_of_paths(), 5);
        assert_relative_eq!(rv.average(), 0.03);
        assert_relative_eq!(rv.variance(), 0.0);
        assert_relative_eq!(rv.time(), 2.0);
    }

    #[test]
    fn test_empty_is_harmless() {
        let rv = RandomVariable::new(0.0, vec![]);
        assert_eq!(rv.average(), 0.0);
        assert_eq!(rv.variance(), 0.0);
    }
}

use std::convert::TryFrom;
use std::iter::FromIterator;

use log::debug;
use log::warn;

use crate::config::Accumulation;
use crate::config::Config;
use crate::config::Mode;
use crate::error::RegressionError;
use crate::linest::Linest;
use crate::sample::Coefficients;
use crate::sample::Sample;
use crate::solver;
use crate::solver::SolverKind;

/// Least-squares fit of `y = b0 + b1·x1 + ... + bN·xN` over every sample pushed so far.
///
/// The dataset only grows. Each `solve` fits the whole history; with
/// [`Accumulation::Incremental`] the sufficient statistics are maintained on push, with
/// [`Accumulation::Batch`] they are recomputed from the stored samples.
#[derive(Clone, Debug)]
pub struct LinearRegression<const N: usize> {
    samples: Vec<Sample<N>>,
    linest: Linest<N>,
    solver: SolverKind,
    config: Config,
}

pub type SimpleLinearRegression = LinearRegression<1>;
pub type TwoVariableLinearRegression = LinearRegression<2>;

impl<const N: usize> Default for LinearRegression<N> {
    fn default() -> Self {
        LinearRegression::new()
    }
}

impl<const N: usize> LinearRegression<N> {
    pub fn new() -> Self {
        LinearRegression::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        LinearRegression {
            samples: Vec::new(),
            linest: Linest::default(),
            solver: SolverKind::select(N, config.solver),
            config,
        }
    }

    pub fn push(&mut self, sample: Sample<N>) {
        if self.config.accumulation == Accumulation::Incremental {
            self.linest.push(&sample);
        }
        self.samples.push(sample);
    }

    /// Pushes `x1, ..., xN, y`. The dataset is left untouched on an arity mismatch.
    pub fn try_push(&mut self, values: &[f64]) -> Result<(), RegressionError> {
        let sample = Sample::try_from(values)?;
        self.push(sample);
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn get(&self) -> &[Sample<N>] {
        &self.samples
    }

    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn statistics(&self) -> Linest<N> {
        match self.config.accumulation {
            Accumulation::Incremental => self.linest,
            Accumulation::Batch => Linest::from_samples(&self.samples),
        }
    }

    pub fn solve(&self) -> Result<Coefficients<N>, RegressionError> {
        let strict = self.config.mode == Mode::Strict;
        if strict && self.samples.len() < N + 1 {
            return Err(RegressionError::InsufficientData {
                needed: N + 1,
                got: self.samples.len(),
            });
        }

        let statistics = self.statistics();
        if strict {
            solver::check_singular(&statistics, self.config.singular_tolerance)?;
        }

        let solution = self.solver.solve(&statistics);
        debug!(
            "{} solver over {} samples: {} (determinant {:e})",
            self.solver,
            self.samples.len(),
            solution.coefficients,
            solution.determinant
        );
        if !solution.coefficients.is_finite() {
            warn!("non-finite coefficients: {}", solution.coefficients);
        }
        Ok(solution.coefficients)
    }

    pub fn r_squared(&self) -> Result<f64, RegressionError> {
        let coefficients = self.solve()?;
        Ok(self.statistics().r_squared(&coefficients))
    }
}

impl<const N: usize> Extend<Sample<N>> for LinearRegression<N> {
    fn extend<I: IntoIterator<Item = Sample<N>>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl<const N: usize> FromIterator<Sample<N>> for LinearRegression<N> {
    fn from_iter<I: IntoIterator<Item = Sample<N>>>(iter: I) -> Self {
        let mut regression = LinearRegression::new();
        regression.extend(iter);
        regression
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::LinearRegression;
    use super::SimpleLinearRegression;
    use super::TwoVariableLinearRegression;
    use crate::config::Accumulation;
    use crate::config::Config;
    use crate::config::Mode;
    use crate::config::SolverChoice;
    use crate::error::RegressionError;
    use crate::sample::Coefficients;
    use crate::sample::Sample;
    use crate::solver::SolverKind;

    fn assert_coefficients<const N: usize>(got: &Coefficients<N>, expected: &[f64], tolerance: f64) {
        assert_eq!(got.to_vec().len(), expected.len());
        for (g, e) in got.to_vec().iter().zip(expected) {
            assert!(
                (g - e).abs() <= tolerance * e.abs().max(1.0),
                "got {:?}, expected {:?}",
                got,
                expected
            );
        }
    }

    fn configs() -> Vec<Config> {
        let accumulations = [Accumulation::Incremental, Accumulation::Batch];
        let solvers = [SolverChoice::Auto, SolverChoice::General];
        accumulations
            .iter()
            .cartesian_product(solvers.iter())
            .map(|(&accumulation, &solver)| Config {
                accumulation,
                solver,
                ..Config::default()
            })
            .collect_vec()
    }

    fn lenient() -> Config {
        Config {
            mode: Mode::Lenient,
            ..Config::default()
        }
    }

    fn noisy_samples(n: usize) -> Vec<Sample<2>> {
        (0..n)
            .map(|i| {
                let x1 = (i * 7 % 11) as f64;
                let x2 = (i * 5 % 13) as f64 * 0.5;
                let noise = ((i * 3 % 7) as f64 - 3.0) * 0.1;
                Sample::new([x1, x2], 1.0 + 2.0 * x1 - 3.0 * x2 + noise)
            })
            .collect()
    }

    #[test]
    fn test_push_size_get() {
        let mut regression = TwoVariableLinearRegression::new();
        assert_eq!(regression.size(), 0);
        let samples = noisy_samples(6);
        for (i, sample) in samples.iter().enumerate() {
            regression.push(*sample);
            assert_eq!(regression.size(), i + 1);
        }
        assert_eq!(regression.get(), samples.as_slice());
    }

    #[test]
    fn test_try_push_arity_mismatch() {
        let mut regression = TwoVariableLinearRegression::new();
        regression.try_push(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            regression.try_push(&[1.0, 2.0]),
            Err(RegressionError::ArityMismatch {
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            regression.try_push(&[1.0, 2.0, 3.0, 4.0]),
            Err(RegressionError::ArityMismatch {
                expected: 3,
                got: 4
            })
        );
        assert_eq!(regression.size(), 1);
        assert_eq!(regression.get(), &[Sample::new([1.0, 2.0], 3.0)]);
        assert_eq!(regression.statistics().count(), 1);
    }

    #[test]
    fn test_solver_selection() {
        assert_eq!(SimpleLinearRegression::new().solver(), SolverKind::Simple);
        assert_eq!(TwoVariableLinearRegression::new().solver(), SolverKind::TwoVariable);
        assert_eq!(LinearRegression::<3>::new().solver(), SolverKind::General);
        let general = Config {
            solver: SolverChoice::General,
            ..Config::default()
        };
        assert_eq!(SimpleLinearRegression::with_config(general).solver(), SolverKind::General);
    }

    #[test]
    fn test_simple_scenario() {
        for config in configs() {
            let mut regression = SimpleLinearRegression::with_config(config);
            for &(x, y) in &[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)] {
                regression.push(Sample::new([x], y));
            }
            let coefficients = regression.solve().unwrap();
            assert_coefficients(&coefficients, &[0.0, 2.0], 1e-12);
        }
    }

    #[test]
    fn test_two_variable_scenario() {
        for config in configs() {
            let mut regression = TwoVariableLinearRegression::with_config(config);
            regression.try_push(&[0.0, 0.0, 1.0]).unwrap();
            regression.try_push(&[1.0, 0.0, 3.0]).unwrap();
            regression.try_push(&[0.0, 1.0, 5.0]).unwrap();
            let coefficients = regression.solve().unwrap();
            assert_coefficients(&coefficients, &[1.0, 2.0, 4.0], 1e-12);
        }
    }

    #[test]
    fn test_general_three_variables() {
        let regression: LinearRegression<3> = (0..20)
            .map(|i| {
                let x = [(i % 5) as f64, (i * 3 % 7) as f64, (i * i % 11) as f64];
                Sample::new(x, -2.0 + 0.5 * x[0] + 1.5 * x[1] - 0.25 * x[2])
            })
            .collect();
        let coefficients = regression.solve().unwrap();
        assert_coefficients(&coefficients, &[-2.0, 0.5, 1.5, -0.25], 1e-9);
    }

    #[test]
    fn test_order_independent() {
        let samples = noisy_samples(6);
        for config in configs() {
            let reference = samples
                .iter()
                .copied()
                .collect::<TwoVariableLinearRegression>()
                .solve()
                .unwrap();
            for permutation in samples.iter().copied().permutations(samples.len()) {
                let mut regression = TwoVariableLinearRegression::with_config(config.clone());
                regression.extend(permutation);
                let coefficients = regression.solve().unwrap();
                assert_coefficients(&coefficients, &reference.to_vec(), 1e-9);
            }
        }
    }

    #[test]
    fn test_exact_fit_with_large_offsets() {
        let samples = (0..5000)
            .map(|i| {
                let x1 = 1.0e4 + (i % 17) as f64 * 0.5;
                let x2 = -5.0e3 + (i % 13) as f64 * 0.25;
                Sample::new([x1, x2], 1.0 + 2.0 * x1 + 4.0 * x2)
            })
            .collect_vec();
        for config in configs() {
            let mut regression = TwoVariableLinearRegression::with_config(config);
            regression.extend(samples.iter().copied());
            let coefficients = regression.solve().unwrap();
            assert_coefficients(&coefficients, &[1.0, 2.0, 4.0], 1e-6);
        }
    }

    #[test]
    fn test_exact_fit_simple_many_samples() {
        for config in configs() {
            let mut regression = SimpleLinearRegression::with_config(config);
            regression.extend((0..1000).map(|i| {
                let x = 100.0 + (i % 10) as f64;
                Sample::new([x], 0.75 - 1.25 * x)
            }));
            let coefficients = regression.solve().unwrap();
            assert_coefficients(&coefficients, &[0.75, -1.25], 1e-6);
        }
    }

    #[test]
    fn test_exact_fit_simple_at_million_offset() {
        let samples = (0..1000)
            .map(|i| {
                let x = 1.0e6 + (i % 10) as f64;
                Sample::new([x], 1.0 + 2.0 * x)
            })
            .collect_vec();
        for config in configs() {
            let mut regression = SimpleLinearRegression::with_config(config.clone());
            regression.extend(samples.iter().copied());
            let coefficients = regression.solve().unwrap_or_else(|e| panic!("{:?}: {}", config, e));
            assert_coefficients(&coefficients, &[1.0, 2.0], 1e-6);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let mut regression = TwoVariableLinearRegression::new();
        assert_eq!(
            regression.solve(),
            Err(RegressionError::InsufficientData { needed: 3, got: 0 })
        );
        regression.try_push(&[0.0, 0.0, 1.0]).unwrap();
        regression.try_push(&[1.0, 0.0, 3.0]).unwrap();
        assert_eq!(
            regression.solve(),
            Err(RegressionError::InsufficientData { needed: 3, got: 2 })
        );
    }

    #[test]
    fn test_collinear_is_singular() {
        for config in configs() {
            let mut regression = TwoVariableLinearRegression::with_config(config);
            for x in &[1.0, 2.0, 3.0, 4.0, 5.0] {
                regression.push(Sample::new([*x, 2.0 * x], 3.0 * x));
            }
            assert!(matches!(
                regression.solve(),
                Err(RegressionError::SingularDesignMatrix { .. })
            ));
        }
    }

    #[test]
    fn test_constant_x_is_singular() {
        for config in configs() {
            let mut regression = SimpleLinearRegression::with_config(config);
            for y in &[1.0, 2.0, 3.0] {
                regression.push(Sample::new([4.0], *y));
            }
            assert!(matches!(
                regression.solve(),
                Err(RegressionError::SingularDesignMatrix { .. })
            ));
        }
    }

    #[test]
    fn test_inexact_constant_x_is_singular() {
        for config in configs() {
            let mut regression = SimpleLinearRegression::with_config(config.clone());
            for y in &[1.0, 2.0, 3.0] {
                regression.push(Sample::new([0.1], *y));
            }
            assert!(
                matches!(
                    regression.solve(),
                    Err(RegressionError::SingularDesignMatrix { .. })
                ),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_lenient_propagates_non_finite() {
        let mut regression = TwoVariableLinearRegression::with_config(lenient());
        for x in &[1.0, 2.0, 3.0] {
            regression.push(Sample::new([*x, 2.0 * x], 3.0 * x));
        }
        assert!(!regression.solve().unwrap().is_finite());

        let empty = SimpleLinearRegression::with_config(lenient());
        assert!(!empty.solve().unwrap().is_finite());
    }

    #[test]
    fn test_lenient_matches_strict_on_regular_data() {
        let samples = noisy_samples(10);
        let strict: TwoVariableLinearRegression = samples.iter().copied().collect();
        let mut lenient = TwoVariableLinearRegression::with_config(lenient());
        lenient.extend(samples);
        assert_eq!(strict.solve().unwrap(), lenient.solve().unwrap());
    }

    #[test]
    fn test_incremental_matches_batch() {
        let samples = noisy_samples(40);
        for solver in [SolverChoice::Auto, SolverChoice::General] {
            let mut incremental = TwoVariableLinearRegression::with_config(Config {
                solver,
                accumulation: Accumulation::Incremental,
                ..Config::default()
            });
            let mut batch = TwoVariableLinearRegression::with_config(Config {
                solver,
                accumulation: Accumulation::Batch,
                ..Config::default()
            });
            for (i, sample) in samples.iter().enumerate() {
                incremental.push(*sample);
                batch.push(*sample);
                if i + 1 >= 3 {
                    let expected = batch.solve().unwrap();
                    assert_coefficients(&incremental.solve().unwrap(), &expected.to_vec(), 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_noisy_fit_is_close() {
        let regression: TwoVariableLinearRegression = noisy_samples(200).into_iter().collect();
        let coefficients = regression.solve().unwrap();
        assert_coefficients(&coefficients, &[1.0, 2.0, -3.0], 0.1);
        let r2 = regression.r_squared().unwrap();
        assert!(r2 > 0.99 && r2 <= 1.0, "{}", r2);
    }
}

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::config::SolverChoice;
use crate::error::RegressionError;
use crate::linest::Linest;
use crate::sample::Coefficients;

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum SolverKind {
    Simple,
    TwoVariable,
    General,
}

impl SolverKind {
    pub fn select(dimension: usize, choice: SolverChoice) -> Self {
        match (choice, dimension) {
            (SolverChoice::Auto, 1) => SolverKind::Simple,
            (SolverChoice::Auto, 2) => SolverKind::TwoVariable,
            _ => SolverKind::General,
        }
    }

    /// Falls back to the LU solve when the closed form does not match `N`.
    pub fn solve<const N: usize>(self, linest: &Linest<N>) -> Solution<N> {
        match self {
            SolverKind::Simple if N == 1 => simple(linest),
            SolverKind::TwoVariable if N == 2 => two_variable(linest),
            _ => general(linest),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solution<const N: usize> {
    pub coefficients: Coefficients<N>,
    /// Determinant of the matrix the variant inverts.
    pub determinant: f64,
}

fn centered_gram<const N: usize>(linest: &Linest<N>) -> DMatrix<f64> {
    DMatrix::from_fn(N, N, |i, j| linest.sxx()[i][j])
}

/// Decides singularity from the accumulated sums alone, so every variant agrees.
///
/// A column is flat when its spread is lost next to its magnitude:
/// `Sxixi <= tolerance² · Σxi²`. Otherwise the columns are collinear when
/// `|det Sxx| <= tolerance · Π Sxixi`, the right-hand side being Hadamard's bound.
/// NaN anywhere counts as singular.
pub fn check_singular<const N: usize>(
    linest: &Linest<N>,
    tolerance: f64,
) -> Result<(), RegressionError> {
    let flat = (0..N).any(|i| {
        let spread = linest.sxx()[i][i];
        !(spread > tolerance * tolerance * linest.sum_xx(i, i))
    });
    let determinant = centered_gram(linest).determinant();
    let bound: f64 = (0..N).map(|i| linest.sxx()[i][i]).product();
    if flat || !(determinant.abs() > tolerance * bound) {
        return Err(RegressionError::SingularDesignMatrix {
            determinant,
            tolerance,
        });
    }
    Ok(())
}

// Adjugate inverse of the 2×2 normal matrix, built over x shifted by its mean.
// The shift makes Σ(x - x̄) vanish; the intercept is shifted back at the end.
fn simple<const N: usize>(linest: &Linest<N>) -> Solution<N> {
    let a = linest.count() as f64;
    let b = 0.0;
    let c = b;
    let d = linest.sxx()[0][0];
    let det = a * d - b * c;

    let inv_a = a / det;
    let inv_b = -b / det;
    let inv_c = -c / det;
    let inv_d = d / det;

    let y0 = linest.sum_y();
    let y1 = linest.sxy()[0];

    let mut slopes = [0.0; N];
    slopes[0] = inv_c * y0 + inv_a * y1;
    let shifted_intercept = inv_d * y0 + inv_b * y1;
    Solution {
        coefficients: Coefficients::new(
            shifted_intercept - slopes[0] * linest.mean_x()[0],
            slopes,
        ),
        determinant: det,
    }
}

fn two_variable<const N: usize>(linest: &Linest<N>) -> Solution<N> {
    let sxx = linest.sxx();
    let sxy = linest.sxy();
    let (s11, s22, s12) = (sxx[0][0], sxx[1][1], sxx[0][1]);
    let (s1y, s2y) = (sxy[0], sxy[1]);

    let denom = s11 * s22 - s12 * s12;
    let b1 = (s22 * s1y - s12 * s2y) / denom;
    let b2 = (s11 * s2y - s12 * s1y) / denom;

    let mean_x = linest.mean_x();
    let b0 = linest.mean_y() - b1 * mean_x[0] - b2 * mean_x[1];

    let mut slopes = [0.0; N];
    slopes[0] = b1;
    slopes[1] = b2;
    Solution {
        coefficients: Coefficients::new(b0, slopes),
        determinant: denom,
    }
}

/// The intercept row of the full normal equations is eliminated up front, which leaves
/// `Sxx · b = Sxy` over the centered sums; the intercept is recovered from the means.
fn general<const N: usize>(linest: &Linest<N>) -> Solution<N> {
    let lu = centered_gram(linest).lu();
    let determinant = lu.determinant();
    let solution = lu
        .solve(&DVector::from_column_slice(linest.sxy()))
        .unwrap_or_else(|| DVector::from_element(N, f64::NAN));

    let mut slopes = [0.0; N];
    slopes.copy_from_slice(solution.as_slice());

    let intercept = linest.mean_y()
        - slopes
            .iter()
            .zip(linest.mean_x())
            .map(|(b, mean)| b * mean)
            .sum::<f64>();
    Solution {
        coefficients: Coefficients::new(intercept, slopes),
        determinant,
    }
}

use log::trace;

use crate::sample::Coefficients;
use crate::sample::Sample;

/// Sufficient statistics of a sample set, kept in mean-centered form.
///
/// `sxx`, `sxy` and `syy` are the co-moments `Σ(xi - x̄i)(xj - x̄j)`, `Σ(xi - x̄i)(y - ȳ)` and
/// `Σ(y - ȳ)²`. Raw sums such as `Σx²` are derived from them on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linest<const N: usize> {
    n: usize,
    mean_x: [f64; N],
    mean_y: f64,
    sxx: [[f64; N]; N],
    sxy: [f64; N],
    syy: f64,
}

impl<const N: usize> Default for Linest<N> {
    fn default() -> Self {
        Linest {
            n: 0,
            mean_x: [0.0; N],
            mean_y: 0.0,
            sxx: [[0.0; N]; N],
            sxy: [0.0; N],
            syy: 0.0,
        }
    }
}

impl<const N: usize> Linest<N> {
    /// Rank-1 update (Welford).
    pub fn push(&mut self, sample: &Sample<N>) {
        self.n += 1;
        let n = self.n as f64;

        let mut dx = [0.0; N];
        for (d, (x, mean)) in dx.iter_mut().zip(sample.x.iter().zip(&self.mean_x)) {
            *d = x - mean;
        }
        let dy = sample.y - self.mean_y;

        for i in 0..N {
            for j in 0..N {
                self.sxx[i][j] += dx[i] * dx[j] * (n - 1.0) / n;
            }
            self.sxy[i] += dx[i] * dy * (n - 1.0) / n;
            self.mean_x[i] += dx[i] / n;
        }
        self.syy += dy * dy * (n - 1.0) / n;
        self.mean_y += dy / n;

        trace!("linest absorbed sample #{}: {:?}", self.n, sample);
    }

    pub fn from_samples(samples: &[Sample<N>]) -> Self {
        let mut linest = Linest {
            n: samples.len(),
            ..Linest::default()
        };
        if samples.is_empty() {
            return linest;
        }
        let n = samples.len() as f64;

        for sample in samples {
            for (mean, x) in linest.mean_x.iter_mut().zip(&sample.x) {
                *mean += x;
            }
            linest.mean_y += sample.y;
        }
        for mean in &mut linest.mean_x {
            *mean /= n;
        }
        linest.mean_y /= n;

        for sample in samples {
            let mut dx = [0.0; N];
            for (d, (x, mean)) in dx.iter_mut().zip(sample.x.iter().zip(&linest.mean_x)) {
                *d = x - mean;
            }
            let dy = sample.y - linest.mean_y;
            for i in 0..N {
                for j in 0..N {
                    linest.sxx[i][j] += dx[i] * dx[j];
                }
                linest.sxy[i] += dx[i] * dy;
            }
            linest.syy += dy * dy;
        }
        linest
    }

    pub fn count(&self) -> usize {
        self.n
    }

    pub fn mean_x(&self) -> &[f64; N] {
        &self.mean_x
    }

    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    pub fn sxx(&self) -> &[[f64; N]; N] {
        &self.sxx
    }

    pub fn sxy(&self) -> &[f64; N] {
        &self.sxy
    }

    pub fn syy(&self) -> f64 {
        self.syy
    }

    pub fn sum_x(&self, i: usize) -> f64 {
        self.n as f64 * self.mean_x[i]
    }

    pub fn sum_y(&self) -> f64 {
        self.n as f64 * self.mean_y
    }

    /// `Σxi·xj`
    pub fn sum_xx(&self, i: usize, j: usize) -> f64 {
        self.sxx[i][j] + self.n as f64 * self.mean_x[i] * self.mean_x[j]
    }

    pub fn sum_xy(&self, i: usize) -> f64 {
        self.sxy[i] + self.n as f64 * self.mean_x[i] * self.mean_y
    }

    /// Only meaningful for the least-squares coefficients of this same sample set, where the
    /// residual sum of squares reduces to `Syy - Σ bi·Sxiy`. NaN when `y` has no variance.
    pub fn r_squared(&self, coefficients: &Coefficients<N>) -> f64 {
        let explained: f64 = coefficients
            .slopes()
            .iter()
            .zip(&self.sxy)
            .map(|(b, sxy)| b * sxy)
            .sum();
        let residual = (self.syy - explained).max(0.0);
        1.0 - residual / self.syy
    }
}

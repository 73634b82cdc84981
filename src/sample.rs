use std::convert::TryFrom;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use anyhow::bail;

use crate::error::RegressionError;

/// One observation: `N` independent values followed by the dependent value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample<const N: usize> {
    pub x: [f64; N],
    pub y: f64,
}

impl<const N: usize> Sample<N> {
    pub fn new(x: [f64; N], y: f64) -> Self {
        Sample { x, y }
    }

    pub const fn arity() -> usize {
        N + 1
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.x.iter().copied().chain(Some(self.y)).collect()
    }
}

impl<const N: usize> TryFrom<&[f64]> for Sample<N> {
    type Error = RegressionError;

    fn try_from(values: &[f64]) -> Result<Self, RegressionError> {
        let Some((&y, xs)) = values.split_last() else {
            return Err(RegressionError::ArityMismatch {
                expected: N + 1,
                got: 0,
            });
        };
        let x = <[f64; N]>::try_from(xs).map_err(|_| RegressionError::ArityMismatch {
            expected: N + 1,
            got: values.len(),
        })?;
        Ok(Sample { x, y })
    }
}

impl<const N: usize> FromStr for Sample<N> {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let values: Vec<f64> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()?;
        if values.len() != N + 1 {
            bail!("Expected {} values, found {}", N + 1, values.len());
        }
        Ok(Sample::try_from(values.as_slice())?)
    }
}

/// Fitted `(b0, b1, ..., bN)`: intercept followed by one slope per variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients<const N: usize> {
    intercept: f64,
    slopes: [f64; N],
}

impl<const N: usize> Coefficients<N> {
    pub fn new(intercept: f64, slopes: [f64; N]) -> Self {
        Coefficients { intercept, slopes }
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn slopes(&self) -> &[f64; N] {
        &self.slopes
    }

    pub fn slope(&self, i: usize) -> Option<f64> {
        self.slopes.get(i).copied()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        match i {
            0 => Some(self.intercept),
            i => self.slope(i - 1),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        Some(self.intercept).into_iter().chain(self.slopes.iter().copied()).collect()
    }

    pub fn predict(&self, x: &[f64; N]) -> f64 {
        self.intercept + self.slopes.iter().zip(x).map(|(b, x)| b * x).sum::<f64>()
    }

    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.slopes.iter().all(|b| b.is_finite())
    }
}

impl<const N: usize> Index<usize> for Coefficients<N> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.intercept,
            i => &self.slopes[i - 1],
        }
    }
}

impl<const N: usize> fmt::Display for Coefficients<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y = {}", self.intercept)?;
        for (i, b) in self.slopes.iter().enumerate() {
            if b.is_sign_negative() {
                write!(f, " - {}·x{}", -b, i + 1)?;
            } else {
                write!(f, " + {}·x{}", b, i + 1)?;
            }
        }
        Ok(())
    }
}

use thiserror::Error;

use crate::config::ConfigLoadError;

#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("Expected a sample of {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("At least {needed} samples are needed to solve, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("Design matrix is singular (determinant {determinant:e}, tolerance {tolerance:e})")]
    SingularDesignMatrix { determinant: f64, tolerance: f64 },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error while loading config: {0}")]
    ConfigLoadError(#[from] ConfigLoadError),
    #[error("Error while reading samples: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Malformed sample on line {line}: {reason}")]
    MalformedSample { line: usize, reason: anyhow::Error },
}

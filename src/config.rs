use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-10;

/// How `solve` treats degenerate input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Strict,
    /// Solve unconditionally, letting division by zero show up as NaN or infinity.
    Lenient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Accumulation {
    Incremental,
    Batch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum SolverChoice {
    Auto,
    General,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub mode: Mode,
    pub singular_tolerance: f64,
    pub accumulation: Accumulation,
    pub solver: SolverChoice,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Strict,
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
            accumulation: Accumulation::Incremental,
            solver: SolverChoice::Auto,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigLoadError> {
        let mut s = String::new();
        BufReader::new(File::open(path)?).read_to_string(&mut s)?;
        Config::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Config, ConfigLoadError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let tolerance = self.singular_tolerance;
        if !tolerance.is_finite() || !(0.0..1.0).contains(&tolerance) {
            return Err(ConfigLoadError::InvalidTolerance(tolerance));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("{0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    IllegalConfigEntry(#[from] toml::de::Error),
    #[error("singular-tolerance must be a finite value in [0, 1), got {0}")]
    InvalidTolerance(f64),
}

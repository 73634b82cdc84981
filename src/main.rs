use std::io;
use std::io::BufRead;

use log::info;
use log::warn;
use planefit::config::Config;
use planefit::config::ConfigLoadError;
use planefit::error::AppError;
use planefit::regression::TwoVariableLinearRegression;
use planefit::sample::Coefficients;
use planefit::sample::Sample;

const CONFIG_PATH: &str = "planefit.toml";
const GRID_SIZE: f64 = 32.0;

fn main() -> Result<(), AppError> {
    env_logger::init();

    let config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(ConfigLoadError::IOError(e)) if e.kind() == io::ErrorKind::NotFound => {
            info!("{} not found, using defaults", CONFIG_PATH);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    info!("{:?}", config);

    let mut regression = TwoVariableLinearRegression::with_config(config);
    match fit_lines(io::stdin().lock(), &mut regression)? {
        Some(coefficients) => println!("{}", coefficients),
        None => println!("no plane fitted"),
    }
    Ok(())
}

/// Pushes every `x1 x2 y` line and refits after each one.
///
/// Returns the last plane that solved; a failed solve keeps the previous one.
fn fit_lines(
    input: impl BufRead,
    regression: &mut TwoVariableLinearRegression,
) -> Result<Option<Coefficients<2>>, AppError> {
    let mut latest = None;
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sample: Sample<2> = line.parse().map_err(|reason| AppError::MalformedSample {
            line: i + 1,
            reason,
        })?;
        regression.push(sample);
        info!("picked {:?} ({} samples)", sample, regression.size());

        match regression.solve() {
            Ok(coefficients) => {
                let [p1, p2, p3, p4] = corner_heights(&coefficients);
                info!("{}; corners {} {} {} {}", coefficients, p1, p2, p3, p4);
                latest = Some(coefficients);
            }
            Err(e) => warn!("plane not updated: {}", e),
        }
    }
    Ok(latest)
}

fn corner_heights(coefficients: &Coefficients<2>) -> [f64; 4] {
    [
        [GRID_SIZE, GRID_SIZE],
        [GRID_SIZE, -GRID_SIZE],
        [-GRID_SIZE, -GRID_SIZE],
        [-GRID_SIZE, GRID_SIZE],
    ]
    .map(|corner| coefficients.predict(&corner))
}

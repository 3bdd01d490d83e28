//! Volatility calculations
//!
//! Trailing sample standard deviation, matching the rolling statistics
//! used by the lag features.

use crate::moving_averages::trailing_window;
use crate::Result;
use statrs::statistics::Statistics;

/// Sample standard deviation (n - 1 divisor) of `values[end - window..end]`
///
/// A window of a single value has no spread estimate and yields `NaN`,
/// as the sample estimator is undefined there.
pub fn trailing_std_dev(values: &[f64], end: usize, window: usize) -> Result<f64> {
    let slice = trailing_window(values, end, window)?;
    Ok(slice.iter().std_dev())
}

/// Population standard deviation (n divisor) of a whole slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    values.iter().population_std_dev()
}

//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Held-out error of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, in percent
    pub mape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RMSE {:.4}, MAPE {:.4}%", self.rmse, self.mape)
    }
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::InvalidParameter(format!(
            "Actual ({}) and predicted ({}) values must have the same non-zero length",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    Ok(mse.sqrt())
}

/// Mean absolute percentage error, in percent
///
/// Undefined when an actual value is zero; that case is reported as
/// [`ForecastError::DegenerateSeries`] instead of producing `inf`/`NaN`.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    if let Some(i) = actual.iter().position(|a| *a == 0.0) {
        return Err(ForecastError::DegenerateSeries(format!(
            "MAPE is undefined: actual value at position {} is zero",
            i
        )));
    }

    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    Ok(total / actual.len() as f64 * 100.0)
}

/// Score predictions against actual values
///
/// Non-finite predictions mean the model diverged and are reported as a
/// fitting failure.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<ForecastAccuracy> {
    check_lengths(actual, predicted)?;
    if predicted.iter().any(|p| !p.is_finite()) {
        return Err(ForecastError::FittingError(
            "Model produced non-finite predictions".to_string(),
        ));
    }

    Ok(ForecastAccuracy {
        rmse: root_mean_squared_error(actual, predicted)?,
        mape: mean_absolute_percentage_error(actual, predicted)?,
    })
}

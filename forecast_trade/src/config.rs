//! Pipeline configuration
//!
//! Every tunable of a pipeline run lives in [`PipelineConfig`], which is
//! passed in explicitly. It can be built in code or read from TOML:
//!
//! ```toml
//! horizon = 20
//! test_days = 40
//! ridge_alphas = [0.5, 5.0]
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for one forecasting pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of lag features for the regression forecaster
    pub max_lag: usize,
    /// Business days to forecast
    pub horizon: usize,
    /// Preferred size of the held-out test window
    pub test_days: usize,
    /// Minimum number of training points
    pub min_train_days: usize,
    /// Floor of the test window when it has to shrink
    pub min_test_days: usize,
    /// Candidate ridge regularisation strengths
    pub ridge_alphas: Vec<f64>,
    /// Largest autoregressive order tried by the ARIMA grid
    pub arima_max_p: usize,
    /// Largest differencing order tried by the ARIMA grid
    pub arima_max_d: usize,
    /// Largest moving-average order tried by the ARIMA grid
    pub arima_max_q: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_lag: 30,
            horizon: 30,
            test_days: 60,
            min_train_days: 50,
            min_test_days: 20,
            ridge_alphas: vec![0.1, 1.0, 10.0],
            arima_max_p: 2,
            arima_max_d: 1,
            arima_max_q: 2,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that the settings describe a runnable pipeline
    pub fn validate(&self) -> Result<()> {
        if self.max_lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_lag must be at least 1".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.min_test_days == 0 || self.test_days < self.min_test_days {
            return Err(ForecastError::InvalidParameter(format!(
                "test_days ({}) must be at least min_test_days ({}), which must be positive",
                self.test_days, self.min_test_days
            )));
        }
        if self.min_train_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_train_days must be at least 1".to_string(),
            ));
        }
        if self.ridge_alphas.is_empty()
            || self
                .ridge_alphas
                .iter()
                .any(|a| !a.is_finite() || *a <= 0.0)
        {
            return Err(ForecastError::InvalidParameter(
                "ridge_alphas must be a non-empty list of positive numbers".to_string(),
            ));
        }

        Ok(())
    }
}

//! Ridge regression over lag features
//!
//! Fits a standardised ridge regression on [`FeatureBuilder`] rows and
//! forecasts recursively: each predicted value is appended to the history
//! and feeds the lag features of the next step, so errors compound over
//! the horizon.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureBuilder, DEFAULT_MAX_LAG};
use crate::metrics;
use crate::models::{FittedModel, ForecastModel, ModelKind, TrainedForecastModel};
use tracing::debug;
use trade_math::regression::RidgeRegression;

/// Default candidate regularisation strengths
pub const DEFAULT_ALPHAS: [f64; 3] = [0.1, 1.0, 10.0];

/// Ridge regression forecaster
#[derive(Debug, Clone)]
pub struct RidgeForecaster {
    builder: FeatureBuilder,
    alphas: Vec<f64>,
}

/// Trained ridge forecaster
#[derive(Debug, Clone)]
pub struct TrainedRidgeForecaster {
    builder: FeatureBuilder,
    regression: RidgeRegression,
}

impl Default for RidgeForecaster {
    fn default() -> Self {
        Self {
            builder: FeatureBuilder::default(),
            alphas: DEFAULT_ALPHAS.to_vec(),
        }
    }
}

impl RidgeForecaster {
    /// Create a forecaster with `max_lag` lag features and candidate `alphas`
    pub fn new(max_lag: usize, alphas: Vec<f64>) -> Result<Self> {
        if alphas.is_empty() || alphas.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Alphas must be a non-empty list of positive numbers".to_string(),
            ));
        }

        Ok(Self {
            builder: FeatureBuilder::new(max_lag)?,
            alphas,
        })
    }

    /// Fit on a full series without scoring
    pub fn fit(&self, series: &[f64]) -> Result<TrainedRidgeForecaster> {
        let features = self.builder.build(series)?;
        if features.len() < 2 {
            return Err(ForecastError::FittingError(format!(
                "Ridge regression needs more than {} observations, have {}",
                self.builder.first_target() + 1,
                series.len()
            )));
        }

        let regression = RidgeRegression::fit_cv(features.rows(), features.targets(), &self.alphas)?;
        debug!(
            alpha = regression.alpha(),
            rows = features.len(),
            "fitted ridge regression"
        );

        Ok(TrainedRidgeForecaster {
            builder: self.builder,
            regression,
        })
    }
}

impl ForecastModel for RidgeForecaster {
    fn kind(&self) -> ModelKind {
        ModelKind::Regression
    }

    fn fit_eval(&self, train: &[f64], test: &[f64]) -> Result<FittedModel> {
        let trained = self.fit(train)?;

        // Test rows are built on train ++ test so each one only sees prices
        // before its own target date.
        let joined = [train, test].concat();
        let test_features = self.builder.build(&joined)?.since(train.len());
        if test_features.len() != test.len() {
            return Err(ForecastError::FittingError(format!(
                "Only {} of {} test points have a complete feature history",
                test_features.len(),
                test.len()
            )));
        }

        let predictions = trained.regression.predict(test_features.rows())?;
        let accuracy = metrics::evaluate(test_features.targets(), &predictions)?;

        Ok(FittedModel::new(
            ModelKind::Regression,
            ModelKind::Regression.label(),
            accuracy,
            Box::new(trained),
        ))
    }
}

impl TrainedRidgeForecaster {
    /// Predict the value immediately after the end of `history`
    pub fn predict_next(&self, history: &[f64]) -> Result<f64> {
        let row = self.builder.next_row(history)?;
        Ok(self.regression.predict_row(&row)?)
    }

    /// Selected regularisation strength
    pub fn alpha(&self) -> f64 {
        self.regression.alpha()
    }
}

impl TrainedForecastModel for TrainedRidgeForecaster {
    fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let mut buffer = self.builder.last_window(history).to_vec();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let next = self.predict_next(&buffer)?;
            buffer.push(next);
            forecasts.push(next);
        }

        Ok(forecasts)
    }

    fn describe(&self) -> String {
        format!(
            "ridge(max_lag={}, alpha={})",
            self.builder.max_lag(),
            self.regression.alpha()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_uses_thirty_lags() {
        let forecaster = RidgeForecaster::default();
        assert_eq!(forecaster.builder.max_lag(), DEFAULT_MAX_LAG);
        assert_eq!(forecaster.alphas, vec![0.1, 1.0, 10.0]);
    }

    #[test]
    fn test_recursive_forecast_feeds_back_predictions() {
        // A sinusoid is an exact linear function of its two previous values
        let wave = |t: usize| 100.0 + 10.0 * (0.3 * t as f64).sin();
        let series: Vec<f64> = (0..200).map(wave).collect();
        let trained = RidgeForecaster::new(5, vec![0.1]).unwrap().fit(&series).unwrap();
        let forecast = trained.forecast(&series, 10).unwrap();

        assert_eq!(forecast.len(), 10);
        for (step, value) in forecast.iter().enumerate() {
            assert_abs_diff_eq!(*value, wave(200 + step), epsilon = 1.0);
        }
    }

    #[test]
    fn test_too_short_training_series() {
        let result = RidgeForecaster::default().fit(&[100.0; 31]);
        assert!(matches!(result, Err(ForecastError::FittingError(_))));
    }

    #[test]
    fn test_invalid_alphas() {
        assert!(RidgeForecaster::new(30, vec![]).is_err());
        assert!(RidgeForecaster::new(30, vec![0.0]).is_err());
        assert!(RidgeForecaster::new(0, vec![1.0]).is_err());
    }
}

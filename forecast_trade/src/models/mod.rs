//! Forecasting models for price series
//!
//! Every forecaster implements [`ForecastModel`]: it is fitted on a training
//! split and scored on a held-out test split, producing a [`FittedModel`].
//! A fitted model carries its display name, held-out error and an opaque
//! [`TrainedForecastModel`] handle that produces the final forecast.

use crate::error::{ForecastError, Result};
use crate::metrics::ForecastAccuracy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod arima;
pub mod exponential_smoothing;
pub mod regression;

/// Forecaster family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Ridge regression over lag features, recursive forecasting
    Regression,
    /// Additive-trend exponential smoothing
    Smoothing,
    /// Grid-searched ARIMA
    AutoRegressive,
}

impl ModelKind {
    /// Default display name for the family
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Regression => "ML(Ridge)",
            ModelKind::Smoothing => "ETS",
            ModelKind::AutoRegressive => "ARIMA",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trained model state able to forecast
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizon` values following the end of `history`
    ///
    /// Models whose state is self-contained may ignore `history`.
    fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>>;

    /// Short description of the fitted parameters
    fn describe(&self) -> String;
}

/// A forecaster that can be fitted on a train split and scored on a test split
pub trait ForecastModel: Debug {
    /// Family of the forecaster
    fn kind(&self) -> ModelKind;

    /// Fit on `train`, forecast `test.len()` values and score them against `test`
    fn fit_eval(&self, train: &[f64], test: &[f64]) -> Result<FittedModel>;
}

/// A fitted model tagged with its name and held-out error
#[derive(Debug)]
pub struct FittedModel {
    kind: ModelKind,
    name: String,
    accuracy: ForecastAccuracy,
    handle: Box<dyn TrainedForecastModel>,
}

impl FittedModel {
    /// Tag a trained model
    pub fn new(
        kind: ModelKind,
        name: impl Into<String>,
        accuracy: ForecastAccuracy,
        handle: Box<dyn TrainedForecastModel>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            accuracy,
            handle,
        }
    }

    /// Re-tag the model under another family and name, keeping its state and error
    pub fn relabel(self, kind: ModelKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ..self
        }
    }

    /// Family the model is reported under
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Display name, e.g. `ARIMA(1,1,0)`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Held-out error
    pub fn accuracy(&self) -> ForecastAccuracy {
        self.accuracy
    }

    /// Held-out root mean squared error
    pub fn rmse(&self) -> f64 {
        self.accuracy.rmse
    }

    /// Held-out mean absolute percentage error
    pub fn mape(&self) -> f64 {
        self.accuracy.mape
    }

    /// Description of the underlying fitted parameters
    pub fn parameters(&self) -> String {
        self.handle.describe()
    }

    /// Forecast `horizon` values after `history`
    ///
    /// The result always has exactly `horizon` finite values.
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least 1".to_string(),
            ));
        }

        let values = self.handle.forecast(history, horizon)?;
        if values.len() != horizon {
            return Err(ForecastError::FittingError(format!(
                "{} returned {} values for a horizon of {}",
                self.name,
                values.len(),
                horizon
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::FittingError(format!(
                "{} produced a non-finite forecast",
                self.name
            )));
        }

        Ok(values)
    }
}

/// Predicted prices for consecutive business days after the last observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCurve {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ForecastCurve {
    /// Create a curve; dates and values must have the same non-zero length
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::ValidationError(
                "Forecast curve cannot be empty".to_string(),
            ));
        }
        if values.len() != dates.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match dates length ({})",
                values.len(),
                dates.len()
            )));
        }

        Ok(Self { dates, values })
    }

    /// Forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Forecast dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of forecast steps
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Final forecasted value
    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}

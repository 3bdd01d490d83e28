//! Exponential smoothing with an additive trend (Holt's linear method)
//!
//! Level and trend recursions:
//!
//! ```text
//! level_t = alpha * y_t + (1 - alpha) * (level_{t-1} + trend_{t-1})
//! trend_t = beta * (level_t - level_{t-1}) + (1 - beta) * trend_{t-1}
//! forecast_{t+h} = level_t + h * trend_t
//! ```
//!
//! `alpha`, `beta` and the initial level/trend are estimated by minimising
//! the one-step-ahead squared error: a coarse grid picks the start, then a
//! Nelder-Mead search refines all four together.

use crate::error::{ForecastError, Result};
use crate::metrics;
use crate::models::{FittedModel, ForecastModel, ModelKind, TrainedForecastModel};
use tracing::debug;
use trade_math::optimize::NelderMead;

const ALPHA_GRID: [f64; 6] = [0.1, 0.3, 0.5, 0.7, 0.9, 0.99];
const BETA_GRID: [f64; 5] = [0.0, 0.01, 0.05, 0.1, 0.3];
const MIN_OBSERVATIONS: usize = 3;

/// Holt's additive-trend exponential smoothing
#[derive(Debug, Clone, Default)]
pub struct ExponentialSmoothing;

/// Smoothing parameters and initial state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltParameters {
    /// Level smoothing weight in [0, 1]
    pub alpha: f64,
    /// Trend smoothing weight in [0, 1]
    pub beta: f64,
    /// Level before the first observation
    pub initial_level: f64,
    /// Trend before the first observation
    pub initial_trend: f64,
}

impl HoltParameters {
    fn from_point(point: &[f64]) -> Self {
        Self {
            alpha: point[0].clamp(0.0, 1.0),
            beta: point[1].clamp(0.0, 1.0),
            initial_level: point[2],
            initial_trend: point[3],
        }
    }

    fn to_point(self) -> Vec<f64> {
        vec![self.alpha, self.beta, self.initial_level, self.initial_trend]
    }
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    parameters: HoltParameters,
    level: f64,
    trend: f64,
    sse: f64,
}

/// Run the recursions, returning `(level, trend, sse)` after the last observation
fn smooth(values: &[f64], params: &HoltParameters) -> (f64, f64, f64) {
    let mut level = params.initial_level;
    let mut trend = params.initial_trend;
    let mut sse = 0.0;

    for &y in values {
        let forecast = level + trend;
        let error = y - forecast;
        sse += error * error;

        let previous_level = level;
        level = params.alpha * y + (1.0 - params.alpha) * forecast;
        trend = params.beta * (level - previous_level) + (1.0 - params.beta) * trend;
    }

    (level, trend, sse)
}

impl ExponentialSmoothing {
    /// Create the forecaster
    pub fn new() -> Self {
        Self
    }

    /// Estimate parameters on `values`
    pub fn fit(&self, values: &[f64]) -> Result<TrainedExponentialSmoothing> {
        if values.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::FittingError(format!(
                "Exponential smoothing needs at least {} observations, have {}",
                MIN_OBSERVATIONS,
                values.len()
            )));
        }

        // Start from a state whose first one-step forecast is exactly `values[0]`
        let initial_trend = values[1] - values[0];
        let initial_level = values[0] - initial_trend;

        let mut start: Option<(HoltParameters, f64)> = None;
        for &alpha in &ALPHA_GRID {
            for &beta in &BETA_GRID {
                let params = HoltParameters {
                    alpha,
                    beta,
                    initial_level,
                    initial_trend,
                };
                let (_, _, sse) = smooth(values, &params);
                if start.map_or(true, |(_, best)| sse < best) {
                    start = Some((params, sse));
                }
            }
        }
        let (start, _) = start.ok_or_else(|| {
            ForecastError::FittingError("Empty smoothing parameter grid".to_string())
        })?;

        let minimum = NelderMead::default().minimize(
            |point| smooth(values, &HoltParameters::from_point(point)).2,
            &start.to_point(),
        )?;
        let parameters = HoltParameters::from_point(&minimum.point);
        let (level, trend, sse) = smooth(values, &parameters);
        if !(level.is_finite() && trend.is_finite() && sse.is_finite()) {
            return Err(ForecastError::FittingError(
                "Exponential smoothing did not converge to a finite state".to_string(),
            ));
        }

        debug!(
            alpha = parameters.alpha,
            beta = parameters.beta,
            sse,
            iterations = minimum.iterations,
            "fitted exponential smoothing"
        );

        Ok(TrainedExponentialSmoothing {
            parameters,
            level,
            trend,
            sse,
        })
    }
}

impl ForecastModel for ExponentialSmoothing {
    fn kind(&self) -> ModelKind {
        ModelKind::Smoothing
    }

    fn fit_eval(&self, train: &[f64], test: &[f64]) -> Result<FittedModel> {
        let trained = self.fit(train)?;
        let predictions = trained.project(test.len());
        let accuracy = metrics::evaluate(test, &predictions)?;

        Ok(FittedModel::new(
            ModelKind::Smoothing,
            ModelKind::Smoothing.label(),
            accuracy,
            Box::new(trained),
        ))
    }
}

impl TrainedExponentialSmoothing {
    /// `level + h * trend` for `h = 1..=horizon`
    pub fn project(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| self.level + h as f64 * self.trend)
            .collect()
    }

    /// Fitted parameters
    pub fn parameters(&self) -> HoltParameters {
        self.parameters
    }

    /// Level after the last training observation
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Trend after the last training observation
    pub fn trend(&self) -> f64 {
        self.trend
    }

    /// In-sample one-step-ahead sum of squared errors
    pub fn sse(&self) -> f64 {
        self.sse
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn forecast(&self, _history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        Ok(self.project(horizon))
    }

    fn describe(&self) -> String {
        format!(
            "holt(alpha={:.4}, beta={:.4})",
            self.parameters.alpha, self.parameters.beta
        )
    }
}

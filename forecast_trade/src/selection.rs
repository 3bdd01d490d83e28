//! Train/test splitting and model selection
//!
//! Every forecaster is fitted and scored on the same split; the one with
//! the lowest held-out RMSE wins. Ties go to the forecaster evaluated first.

use crate::config::PipelineConfig;
use crate::error::{ForecastError, Result};
use crate::metrics::ForecastAccuracy;
use crate::models::arima::ArimaGridSearch;
use crate::models::exponential_smoothing::ExponentialSmoothing;
use crate::models::regression::RidgeForecaster;
use crate::models::{FittedModel, ForecastModel, ModelKind};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Return the first candidate with the strictly lowest score
///
/// A later candidate only replaces the current best when its score is
/// strictly lower, so ties keep the earlier one. NaN scores never win.
pub fn first_minimum<T, I, F>(candidates: I, score: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> f64,
{
    let mut best: Option<(T, f64)> = None;
    for candidate in candidates {
        let value = score(&candidate);
        if value.is_nan() {
            continue;
        }
        match &best {
            Some((_, best_value)) if value >= *best_value => {}
            _ => best = Some((candidate, value)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Size of the test window for a series of `len` points
///
/// The preferred window is used when `len` leaves at least `min_train`
/// training points. Otherwise it shrinks to
/// `max(min_test, min(test_days, len / 4))`. Fails when the series cannot
/// hold `min_train` training points even after shrinking.
pub fn split_point(
    len: usize,
    test_days: usize,
    min_train: usize,
    min_test: usize,
) -> Result<usize> {
    let test_len = if len >= test_days + min_train {
        test_days
    } else {
        min_test.max(test_days.min(len / 4))
    };

    if len < test_len + min_train {
        return Err(ForecastError::InsufficientData(format!(
            "Need at least {} observations, have {}",
            min_test + min_train,
            len
        )));
    }

    Ok(len - test_len)
}

/// Split a series into leading train and trailing test slices
pub fn train_test_split<'a>(
    values: &'a [f64],
    config: &PipelineConfig,
) -> Result<(&'a [f64], &'a [f64])> {
    let train_len = split_point(
        values.len(),
        config.test_days,
        config.min_train_days,
        config.min_test_days,
    )?;
    Ok(values.split_at(train_len))
}

/// Held-out score of one forecaster that fitted successfully
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelScore {
    /// Forecaster family
    pub kind: ModelKind,
    /// Display name of the fitted model
    pub name: String,
    /// Held-out error
    pub accuracy: ForecastAccuracy,
}

/// Outcome of model selection
#[derive(Debug)]
pub struct Selection {
    /// The winning model
    pub best: FittedModel,
    /// Scores of every forecaster that fitted, in evaluation order
    pub leaderboard: Vec<ModelScore>,
}

/// Fits a fixed set of forecasters on one split and picks the best
#[derive(Debug)]
pub struct ModelSelector {
    candidates: Vec<Box<dyn ForecastModel>>,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(vec![
            Box::new(RidgeForecaster::default()),
            Box::new(ExponentialSmoothing::new()),
            Box::new(ArimaGridSearch::default()),
        ])
    }
}

impl ModelSelector {
    /// Select among `candidates`, evaluated in the given order
    pub fn new(candidates: Vec<Box<dyn ForecastModel>>) -> Self {
        Self { candidates }
    }

    /// Regression, smoothing and ARIMA forecasters configured from `config`
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(vec![
            Box::new(RidgeForecaster::new(
                config.max_lag,
                config.ridge_alphas.clone(),
            )?),
            Box::new(ExponentialSmoothing::new()),
            Box::new(ArimaGridSearch::new(
                config.arima_max_p,
                config.arima_max_d,
                config.arima_max_q,
            )),
        ]))
    }

    /// Number of candidate forecasters
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Fit and score every candidate on `(train, test)` and keep the lowest RMSE
    ///
    /// Candidates whose fit fails are left out. Fails with
    /// [`ForecastError::NoViableModel`] when none fit.
    pub fn select(&self, train: &[f64], test: &[f64]) -> Result<Selection> {
        let mut fitted = Vec::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            match candidate.fit_eval(train, test) {
                Ok(model) => {
                    debug!(
                        kind = %model.kind(),
                        model = model.name(),
                        rmse = model.rmse(),
                        mape = model.mape(),
                        "forecaster evaluated"
                    );
                    fitted.push(model);
                }
                Err(err) => {
                    warn!(kind = %candidate.kind(), error = %err, "forecaster excluded");
                }
            }
        }

        let leaderboard: Vec<ModelScore> = fitted
            .iter()
            .map(|model| ModelScore {
                kind: model.kind(),
                name: model.name().to_string(),
                accuracy: model.accuracy(),
            })
            .collect();

        let best = first_minimum(fitted, FittedModel::rmse).ok_or_else(|| {
            ForecastError::NoViableModel(format!(
                "All {} forecasters failed to fit",
                self.candidates.len()
            ))
        })?;
        info!(model = best.name(), rmse = best.rmse(), "selected model");

        Ok(Selection { best, leaderboard })
    }
}

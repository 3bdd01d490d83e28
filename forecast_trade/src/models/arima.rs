//! ARIMA models for time series forecasting
//!
//! [`ArimaModel`] fits a single ARIMA(p, d, q) order without a constant
//! term: the series is differenced `d` times and the ARMA coefficients are
//! estimated by conditional sum of squares. Start values come from a
//! Hannan-Rissanen regression and are refined by Nelder-Mead, with no
//! stationarity or invertibility constraints.
//!
//! [`ArimaGridSearch`] tries every order of a small grid and keeps the one
//! with the lowest held-out RMSE.

use crate::error::{ForecastError, Result};
use crate::metrics::{self, ForecastAccuracy};
use crate::models::exponential_smoothing::ExponentialSmoothing;
use crate::models::{FittedModel, ForecastModel, ModelKind, TrainedForecastModel};
use crate::selection::first_minimum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trade_math::optimize::NelderMead;
use trade_math::regression::ordinary_least_squares;

/// Observations required beyond `p + q` after differencing
const MIN_EXTRA_OBSERVATIONS: usize = 10;
/// Upper bound on the long autoregression used for Hannan-Rissanen residuals
const MAX_LONG_AR_ORDER: usize = 10;

/// ARIMA order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    /// Create an order triple
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Every order with `p <= max_p`, `d <= max_d`, `q <= max_q`,
    /// enumerated p-major, then d, then q
    pub fn grid(max_p: usize, max_d: usize, max_q: usize) -> Vec<Self> {
        let mut orders = Vec::with_capacity((max_p + 1) * (max_d + 1) * (max_q + 1));
        for p in 0..=max_p {
            for d in 0..=max_d {
                for q in 0..=max_q {
                    orders.push(Self::new(p, d, q));
                }
            }
        }
        orders
    }

    /// Display name, e.g. `ARIMA(1,1,0)`
    pub fn name(&self) -> String {
        format!("ARIMA{}", self)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ArimaOrder,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    order: ArimaOrder,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    /// Last `p` values of the differenced training series
    recent_values: Vec<f64>,
    /// Last `q` in-sample residuals
    recent_shocks: Vec<f64>,
    /// Last value of the series after 0..d differences, deepest level first
    integration_seeds: Vec<f64>,
    sigma2: f64,
}

/// Difference a series `d` times
pub fn difference(values: &[f64], d: usize) -> Vec<f64> {
    let mut result = values.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo one difference: cumulative sum starting from `start`
fn integrate(diffs: &[f64], start: f64) -> Vec<f64> {
    let mut level = start;
    diffs
        .iter()
        .map(|d| {
            level += d;
            level
        })
        .collect()
}

/// Conditional residuals of an ARMA model; the first `p` residuals are zero
fn arma_residuals(values: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; values.len()];

    for t in p..values.len() {
        let mut prediction = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * values[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                prediction += theta * residuals[t - 1 - j];
            }
        }
        residuals[t] = values[t] - prediction;
    }

    residuals
}

/// Conditional sum of squares over positions `p..`
fn conditional_sse(values: &[f64], p: usize, params: &[f64]) -> f64 {
    let (ar, ma) = params.split_at(p);
    arma_residuals(values, ar, ma)[p..]
        .iter()
        .map(|e| e * e)
        .sum()
}

/// Regress `values[t]` on `values[t-1..t-p]` (and `shocks[t-1..t-q]`) for `t >= start`
fn lagged_regression(
    values: &[f64],
    shocks: &[f64],
    p: usize,
    q: usize,
    start: usize,
) -> Result<Vec<f64>> {
    let mut rows = Vec::with_capacity(values.len().saturating_sub(start));
    let mut targets = Vec::with_capacity(values.len().saturating_sub(start));
    for t in start..values.len() {
        let mut row = Vec::with_capacity(p + q);
        row.extend((1..=p).map(|i| values[t - i]));
        row.extend((1..=q).map(|j| shocks[t - j]));
        rows.push(row);
        targets.push(values[t]);
    }

    Ok(ordinary_least_squares(&rows, &targets)?)
}

/// Hannan-Rissanen start values `[phi_1..phi_p, theta_1..theta_q]`
fn hannan_rissanen(values: &[f64], p: usize, q: usize) -> Result<Vec<f64>> {
    if p + q == 0 {
        return Ok(Vec::new());
    }
    if q == 0 {
        return lagged_regression(values, &[], p, 0, p);
    }

    // Residuals of a long autoregression stand in for the unobserved shocks
    let long_order = (p + q).max(MAX_LONG_AR_ORDER.min(values.len() / 4));
    let long_ar = lagged_regression(values, &[], long_order, 0, long_order)?;
    let mut shocks = arma_residuals(values, &long_ar, &[]);
    shocks[..long_order].iter_mut().for_each(|e| *e = 0.0);

    lagged_regression(values, &shocks, p, q, (long_order + q).max(p))
}

impl ArimaModel {
    /// Create a new ARIMA model of the given order
    pub fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    /// Order of the model
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Estimate the model on `values`
    pub fn fit(&self, values: &[f64]) -> Result<TrainedArimaModel> {
        let ArimaOrder { p, d, q } = self.order;
        let differenced = difference(values, d);
        if differenced.len() < p + q + MIN_EXTRA_OBSERVATIONS {
            return Err(ForecastError::FittingError(format!(
                "Insufficient data for {}: {} observations after differencing",
                self.order.name(),
                differenced.len()
            )));
        }

        let start = hannan_rissanen(&differenced, p, q)?;
        let minimum = NelderMead::default()
            .minimize(|params| conditional_sse(&differenced, p, params), &start)?;
        if !minimum.value.is_finite() {
            return Err(ForecastError::FittingError(format!(
                "{} did not converge",
                self.order.name()
            )));
        }

        let (ar, ma) = minimum.point.split_at(p);
        let residuals = arma_residuals(&differenced, ar, ma);
        let sigma2 = minimum.value / (differenced.len() - p) as f64;

        let mut integration_seeds = Vec::with_capacity(d);
        for level in (0..d).rev() {
            let series = difference(values, level);
            integration_seeds.push(series[series.len() - 1]);
        }

        Ok(TrainedArimaModel {
            order: self.order,
            ar_coefficients: ar.to_vec(),
            ma_coefficients: ma.to_vec(),
            recent_values: differenced[differenced.len() - p..].to_vec(),
            recent_shocks: residuals[residuals.len() - q..].to_vec(),
            integration_seeds,
            sigma2,
        })
    }
}

impl TrainedArimaModel {
    /// Forecast `horizon` values after the end of the training series
    pub fn project(&self, horizon: usize) -> Vec<f64> {
        let mut values = self.recent_values.clone();
        let mut shocks = self.recent_shocks.clone();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let mut forecast = 0.0;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                forecast += phi * values[values.len() - 1 - i];
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                forecast += theta * shocks[shocks.len() - 1 - j];
            }

            values.push(forecast);
            // Future shocks have zero expectation
            shocks.push(0.0);
            forecasts.push(forecast);
        }

        for &seed in &self.integration_seeds {
            forecasts = integrate(&forecasts, seed);
        }
        forecasts
    }

    /// Order of the model
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fitted AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Fitted MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Residual variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, _history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        Ok(self.project(horizon))
    }

    fn describe(&self) -> String {
        format!(
            "{} ar={:?} ma={:?}",
            self.order.name(),
            self.ar_coefficients,
            self.ma_coefficients
        )
    }
}

/// A successfully fitted and scored order
#[derive(Debug, Clone)]
pub struct OrderCandidate {
    /// The fitted model
    pub model: TrainedArimaModel,
    /// Held-out error of the model
    pub accuracy: ForecastAccuracy,
}

/// ARIMA order grid search with an exponential smoothing fallback
#[derive(Debug, Clone)]
pub struct ArimaGridSearch {
    orders: Vec<ArimaOrder>,
    fallback: ExponentialSmoothing,
}

impl Default for ArimaGridSearch {
    fn default() -> Self {
        Self::new(2, 1, 2)
    }
}

impl ArimaGridSearch {
    /// Search all orders up to `(max_p, max_d, max_q)`
    pub fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            orders: ArimaOrder::grid(max_p, max_d, max_q),
            fallback: ExponentialSmoothing::new(),
        }
    }

    /// Orders in search order
    pub fn orders(&self) -> &[ArimaOrder] {
        &self.orders
    }

    /// Fit one order on `train` and score its direct forecast against `test`
    pub fn evaluate_order(
        &self,
        order: ArimaOrder,
        train: &[f64],
        test: &[f64],
    ) -> Result<OrderCandidate> {
        let model = ArimaModel::new(order).fit(train)?;
        let predictions = model.project(test.len());
        let accuracy = metrics::evaluate(test, &predictions)?;
        Ok(OrderCandidate { model, accuracy })
    }

    /// Evaluate every order and keep the lowest RMSE, `None` if every order failed
    pub fn search(&self, train: &[f64], test: &[f64]) -> Option<OrderCandidate> {
        let attempts: Vec<(ArimaOrder, Result<OrderCandidate>)> = self
            .orders
            .iter()
            .map(|&order| (order, self.evaluate_order(order, train, test)))
            .collect();
        choose_order(attempts)
    }
}

/// Pick the first order with the strictly lowest RMSE among successful attempts
fn choose_order(attempts: Vec<(ArimaOrder, Result<OrderCandidate>)>) -> Option<OrderCandidate> {
    let successes = attempts.into_iter().filter_map(|(order, attempt)| match attempt {
            Ok(candidate) => {
                debug!(order = %order, rmse = candidate.accuracy.rmse, "evaluated ARIMA order");
                Some(candidate)
            }
            Err(err) => {
                debug!(order = %order, error = %err, "skipping ARIMA order");
                None
            }
        });
    first_minimum(successes, |candidate| candidate.accuracy.rmse)
}

impl ForecastModel for ArimaGridSearch {
    fn kind(&self) -> ModelKind {
        ModelKind::AutoRegressive
    }

    fn fit_eval(&self, train: &[f64], test: &[f64]) -> Result<FittedModel> {
        match self.search(train, test) {
            Some(best) => Ok(FittedModel::new(
                ModelKind::AutoRegressive,
                best.model.order().name(),
                best.accuracy,
                Box::new(best.model),
            )),
            None => {
                warn!("every ARIMA order failed, falling back to exponential smoothing");
                let fallback = self.fallback.fit_eval(train, test)?;
                Ok(fallback.relabel(ModelKind::AutoRegressive, ModelKind::AutoRegressive.label()))
            }
        }
    }
}

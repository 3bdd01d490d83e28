//! End-to-end forecasting pipeline
//!
//! ```text
//! PriceSeries -> train/test split -> ModelSelector -> best model forecast
//!             -> ForecastCurve -> SignalExtractor -> ProfitSimulator
//! ```

use crate::config::PipelineConfig;
use crate::data::{business_days_after, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastCurve, ModelKind};
use crate::profit::{ProfitSimulator, TradePair};
use crate::selection::{train_test_split, ModelScore, ModelSelector};
use crate::signals::{Signal, SignalExtractor};
use serde::Serialize;
use tracing::info;

/// Signals shown in a result summary
pub const SUMMARY_SIGNALS: usize = 8;
/// Trade pairs shown in a result summary
pub const SUMMARY_PAIRS: usize = 4;

/// Everything a pipeline run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    /// Display name of the selected model
    pub best_model_name: String,
    /// Family of the selected model
    pub best_model_kind: ModelKind,
    /// Fitted parameters of the selected model
    pub parameters: String,
    /// Held-out RMSE of the selected model
    pub rmse: f64,
    /// Held-out MAPE of the selected model, in percent
    pub mape: f64,
    /// Forecast for the business days after the last observation
    pub forecast_curve: ForecastCurve,
    /// Change from the last actual price to the last forecast, in percent
    pub change_pct: f64,
    /// Buy and sell signals in chronological order
    pub signals: Vec<Signal>,
    /// Matched buy/sell pairs in chronological order
    pub trade_pairs: Vec<TradePair>,
    /// Total profit of the matched pairs
    pub estimated_profit: f64,
    /// Shares traded per pair
    pub shares: f64,
    /// Last actual price
    pub last_price: f64,
    /// Held-out scores of every forecaster that fitted
    pub leaderboard: Vec<ModelScore>,
}

impl PipelineResult {
    /// The first `n` signals
    pub fn signals_head(&self, n: usize) -> &[Signal] {
        &self.signals[..n.min(self.signals.len())]
    }

    /// The first `n` trade pairs
    pub fn pairs_head(&self, n: usize) -> &[TradePair] {
        &self.trade_pairs[..n.min(self.trade_pairs.len())]
    }

    /// Serialise the full result as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Best model: {} (RMSE {:.4}, MAPE {:.4}%)",
            self.best_model_name, self.rmse, self.mape
        )?;
        writeln!(
            f,
            "Forecast change over {} business days: {:+.2}%",
            self.forecast_curve.horizon(),
            self.change_pct
        )?;

        writeln!(f, "Signals ({} total):", self.signals.len())?;
        for signal in self.signals_head(SUMMARY_SIGNALS) {
            writeln!(f, "  {}", signal)?;
        }

        writeln!(f, "Trades ({} total):", self.trade_pairs.len())?;
        for pair in self.pairs_head(SUMMARY_PAIRS) {
            writeln!(f, "  {}", pair)?;
        }

        write!(
            f,
            "Estimated profit: {:+.2} ({:.4} shares at {:.2})",
            self.estimated_profit, self.shares, self.last_price
        )
    }
}

/// A configured forecasting pipeline
#[derive(Debug)]
pub struct ForecastPipeline {
    config: PipelineConfig,
    selector: ModelSelector,
}

impl ForecastPipeline {
    /// Build the standard three-forecaster pipeline from `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let selector = ModelSelector::from_config(&config)?;
        Ok(Self { config, selector })
    }

    /// Build a pipeline around a custom set of forecasters
    pub fn with_selector(config: PipelineConfig, selector: ModelSelector) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, selector })
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline on `series`, simulating trades worth `amount`
    pub fn run(&self, series: &PriceSeries, amount: f64) -> Result<PipelineResult> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Amount must be a positive number, got {}",
                amount
            )));
        }

        let prices = series.prices();
        let (train, test) = train_test_split(prices, &self.config)?;
        info!(
            observations = prices.len(),
            train = train.len(),
            test = test.len(),
            "running forecast pipeline"
        );

        let selection = self.selector.select(train, test)?;
        let best = selection.best;

        let horizon = self.config.horizon;
        let values = best.forecast(prices, horizon)?;
        let dates = business_days_after(series.last_date(), horizon);
        let forecast_curve = ForecastCurve::new(dates, values)?;

        let last_price = series.last_price();
        let change_pct = (forecast_curve.last_value() - last_price) / last_price * 100.0;

        let signals = SignalExtractor::new().extract(&forecast_curve);
        let outcome = ProfitSimulator::new(amount, last_price)?.simulate(&signals);

        info!(
            model = best.name(),
            change_pct,
            signals = signals.len(),
            pairs = outcome.pairs.len(),
            profit = outcome.profit,
            "forecast pipeline finished"
        );

        Ok(PipelineResult {
            best_model_name: best.name().to_string(),
            best_model_kind: best.kind(),
            parameters: best.parameters(),
            rmse: best.rmse(),
            mape: best.mape(),
            forecast_curve,
            change_pct,
            signals,
            trade_pairs: outcome.pairs,
            estimated_profit: outcome.profit,
            shares: outcome.shares,
            last_price,
            leaderboard: selection.leaderboard,
        })
    }
}

/// Run the default pipeline on `series` with an investment of `amount`
pub fn run_forecast_pipeline(series: &PriceSeries, amount: f64) -> Result<PipelineResult> {
    ForecastPipeline::new(PipelineConfig::default())?.run(series, amount)
}

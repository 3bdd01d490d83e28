//! # Forecast Trade
//!
//! A Rust library for multi-model price forecasting and swing-trading signals.
//!
//! ## Features
//!
//! - Business-day price series with CSV loading and gap filling
//! - Forecasting models (ridge regression over lag features, Holt exponential smoothing, grid-searched ARIMA)
//! - Model selection on a held-out test window
//! - Buy/sell signals from forecast peaks and troughs
//! - Simulated profit of the signals
//! - CSV run log
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use forecast_trade::pipeline::run_forecast_pipeline;
//! use forecast_trade::utils::synthetic_series;
//!
//! # fn main() -> Result<(), forecast_trade::ForecastError> {
//! // Two years of business days
//! let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
//! let series = synthetic_series(500, start, 42)?;
//!
//! // Fit every model, forecast 30 business days and simulate trading 1000
//! let result = run_forecast_pipeline(&series, 1000.0)?;
//!
//! println!("{}", result);
//! assert_eq!(result.forecast_curve.horizon(), 30);
//! # Ok(())
//! # }
//! ```
//!
//! A [`ForecastPipeline`] built from a [`PipelineConfig`] changes the horizon,
//! test window or model grids.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod profit;
pub mod run_log;
pub mod selection;
pub mod signals;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{PricePoint, PriceSeries};
pub use crate::error::ForecastError;
pub use crate::features::FeatureBuilder;
pub use crate::models::{FittedModel, ForecastCurve, ForecastModel, ModelKind};
pub use crate::pipeline::{run_forecast_pipeline, ForecastPipeline, PipelineResult};
pub use crate::profit::{ProfitSimulator, TradePair};
pub use crate::selection::ModelSelector;
pub use crate::signals::{Signal, SignalExtractor, SignalKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

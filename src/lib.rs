//! # Forecast Signals
//!
//! Umbrella crate for the forecasting workspace.
//!
//! - [`trade_math`]: rolling statistics, ridge regression, least squares and
//!   Nelder-Mead minimisation
//! - [`forecast_trade`]: price series, forecasters, model selection, signals
//!   and profit simulation
//!
//! ## Example
//!
//! ```
//! use forecast_signals_workspace::forecast_trade::signals::{extrema, SignalKind};
//!
//! let turns = extrema(&[2.0, 1.0, 3.0, 1.0, 2.0]);
//! assert_eq!(turns[0], (1, SignalKind::Buy));
//! assert_eq!(turns[1], (2, SignalKind::Sell));
//! ```

pub use forecast_trade;
pub use trade_math;

//! # Trade Math
//!
//! Numeric building blocks for price forecasting.
//! This crate provides the trailing-window statistics used for lag features,
//! column standardisation with ridge regression, and a derivative-free
//! minimiser used to estimate smoothing and ARMA parameters.

use thiserror::Error;

pub mod moving_averages;
pub mod optimize;
pub mod regression;
pub mod volatility;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

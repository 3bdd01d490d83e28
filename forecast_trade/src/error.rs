//! Error types for the forecast_trade crate

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the forecast_trade crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is too short, even after shrinking the test window
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A forecaster could not produce a usable model
    #[error("Fitting error: {0}")]
    FittingError(String),

    /// An error metric is undefined for the data (e.g. MAPE with a zero actual)
    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    /// Every forecaster failed to fit
    #[error("No viable model: {0}")]
    NoViableModel(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to parameter or result validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error reading or validating configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::FittingError(err.to_string())
    }
}

impl ForecastError {
    /// Process exit status reported by the command line tool
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::IoError(_) => 1,
            ForecastError::ConfigError(_) | ForecastError::InvalidParameter(_) => 2,
            ForecastError::DataError(_) | ForecastError::CsvError(_) => 3,
            ForecastError::InsufficientData(_) | ForecastError::DegenerateSeries(_) => 4,
            ForecastError::FittingError(_)
            | ForecastError::NoViableModel(_)
            | ForecastError::ValidationError(_) => 5,
            ForecastError::JsonError(_) => 6,
        }
    }
}

impl From<&ForecastError> for std::process::ExitCode {
    fn from(err: &ForecastError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}

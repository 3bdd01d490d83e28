//! Lag features for supervised forecasting
//!
//! Each feature row describes one target position `t` of a price series:
//!
//! | columns | value |
//! |---------|-------|
//! | `lag_1..lag_{max_lag}` | `series[t - k]` |
//! | `roll_mean_7`, `roll_std_7` | mean / sample std of `series[t - 7..t]` |
//! | `roll_mean_14`, `roll_std_14` | mean / sample std of `series[t - 14..t]` |
//!
//! Every column is computed from values strictly before `t`, so a row never
//! sees its own label.

use crate::error::{ForecastError, Result};
use trade_math::moving_averages::trailing_mean;
use trade_math::volatility::trailing_std_dev;

/// Default number of lag columns
pub const DEFAULT_MAX_LAG: usize = 30;

/// Rolling windows, in column order
pub const ROLLING_WINDOWS: [usize; 2] = [7, 14];

const LONGEST_WINDOW: usize = 14;

/// Feature rows with their labels
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
    positions: Vec<usize>,
}

impl FeatureMatrix {
    /// Feature rows, one per target
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Actual price at each target position
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Index of each target in the source series
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows whose target position is `first_position` or later
    pub fn since(&self, first_position: usize) -> FeatureMatrix {
        let start = self.positions.partition_point(|&p| p < first_position);
        FeatureMatrix {
            rows: self.rows[start..].to_vec(),
            targets: self.targets[start..].to_vec(),
            positions: self.positions[start..].to_vec(),
        }
    }
}

/// Builds lag/rolling-statistic feature rows from a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    max_lag: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self {
            max_lag: DEFAULT_MAX_LAG,
        }
    }
}

impl FeatureBuilder {
    /// Create a builder with `max_lag` lag columns
    pub fn new(max_lag: usize) -> Result<Self> {
        if max_lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_lag must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_lag })
    }

    /// Number of lag columns
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Number of columns per row: the lags plus mean/std for each rolling window
    pub fn width(&self) -> usize {
        self.max_lag + 2 * ROLLING_WINDOWS.len()
    }

    /// Column names in row order
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = (1..=self.max_lag).map(|k| format!("lag_{}", k)).collect();
        for window in ROLLING_WINDOWS {
            names.push(format!("roll_mean_{}", window));
            names.push(format!("roll_std_{}", window));
        }
        names
    }

    /// First target position with a complete history
    pub fn first_target(&self) -> usize {
        self.max_lag.max(LONGEST_WINDOW)
    }

    /// Length of the trailing slice needed to seed recursive forecasting
    pub fn window_len(&self) -> usize {
        self.max_lag + LONGEST_WINDOW + 1
    }

    /// Build one row per target position with a complete history
    ///
    /// The first `first_target()` positions are dropped. A series that is
    /// too short yields an empty matrix.
    pub fn build(&self, series: &[f64]) -> Result<FeatureMatrix> {
        let first = self.first_target();
        let count = series.len().saturating_sub(first);
        let mut rows = Vec::with_capacity(count);
        let mut targets = Vec::with_capacity(count);
        let mut positions = Vec::with_capacity(count);

        for t in first..series.len() {
            rows.push(self.row_at(series, t)?);
            targets.push(series[t]);
            positions.push(t);
        }

        Ok(FeatureMatrix {
            rows,
            targets,
            positions,
        })
    }

    /// Feature row for target position `position`, using `series[..position]` only
    pub fn row_at(&self, series: &[f64], position: usize) -> Result<Vec<f64>> {
        if position > series.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Target position {} is beyond the series end ({})",
                position,
                series.len()
            )));
        }
        if position < self.first_target() {
            return Err(ForecastError::InsufficientData(format!(
                "Need {} prior observations for a feature row, have {}",
                self.first_target(),
                position
            )));
        }

        let mut row = Vec::with_capacity(self.width());
        row.extend((1..=self.max_lag).map(|k| series[position - k]));
        for window in ROLLING_WINDOWS {
            row.push(trailing_mean(series, position, window)?);
            row.push(trailing_std_dev(series, position, window)?);
        }

        Ok(row)
    }

    /// Feature row for the position just after the end of `series`
    pub fn next_row(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.row_at(series, series.len())
    }

    /// Minimal trailing slice needed to seed a recursive forecast
    ///
    /// Returns the last `window_len()` values, or the whole series if it is shorter.
    pub fn last_window<'a>(&self, series: &'a [f64]) -> &'a [f64] {
        let start = series.len().saturating_sub(self.window_len());
        &series[start..]
    }
}

//! CSV log of pipeline runs
//!
//! One row per run, successful or not. The header is written only when
//! the log file is created.

use crate::error::{ForecastError, Result};
use crate::pipeline::PipelineResult;
use crate::utils::{round_to, truncate_chars};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Longest error message kept in the log
pub const MAX_ERROR_CHARS: usize = 500;
/// Decimal places kept for logged numbers
const LOG_DECIMALS: u32 = 6;

/// Outcome of a logged run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The pipeline produced a result
    Ok,
    /// The pipeline failed
    Error,
}

/// One row of the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub user_id: String,
    pub timestamp: String,
    pub ticker: String,
    pub amount: f64,
    pub best_model: String,
    pub rmse: Option<f64>,
    pub mape: Option<f64>,
    pub horizon: Option<usize>,
    pub est_profit: Option<f64>,
    pub status: RunStatus,
    pub error_msg: String,
}

fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

impl RunRecord {
    /// Record a successful run
    pub fn success(
        user_id: &str,
        ticker: &str,
        amount: f64,
        at: NaiveDateTime,
        result: &PipelineResult,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            timestamp: format_timestamp(at),
            ticker: ticker.to_string(),
            amount,
            best_model: result.best_model_name.clone(),
            rmse: Some(round_to(result.rmse, LOG_DECIMALS)),
            mape: Some(round_to(result.mape, LOG_DECIMALS)),
            horizon: Some(result.forecast_curve.horizon()),
            est_profit: Some(round_to(result.estimated_profit, LOG_DECIMALS)),
            status: RunStatus::Ok,
            error_msg: String::new(),
        }
    }

    /// Record a failed run
    pub fn failure(
        user_id: &str,
        ticker: &str,
        amount: f64,
        at: NaiveDateTime,
        error: &ForecastError,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            timestamp: format_timestamp(at),
            ticker: ticker.to_string(),
            amount,
            best_model: String::new(),
            rmse: None,
            mape: None,
            horizon: None,
            est_profit: None,
            status: RunStatus::Error,
            error_msg: truncate_chars(&error.to_string(), MAX_ERROR_CHARS),
        }
    }
}

/// Append-only CSV run log
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Log to the CSV file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file is new
    pub fn append(&self, record: &RunRecord) -> Result<()> {
        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!(path = %self.path.display(), status = ?record.status, "appended run log");
        Ok(())
    }

    /// Read every record back
    pub fn read_all(&self) -> Result<Vec<RunRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_failure_record_truncates_message() {
        let error = ForecastError::DataError("x".repeat(800));
        let record = RunRecord::failure("7", "AAPL", 1000.0, at(), &error);
        assert_eq!(record.status, RunStatus::Error);
        assert_eq!(record.error_msg.chars().count(), MAX_ERROR_CHARS);
        assert_eq!(record.timestamp, "2024-05-06T09:30:00");
        assert!(record.rmse.is_none());
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let log = RunLog::new(dir.path().join("runs.csv"));
        let error = ForecastError::NoViableModel("all failed".to_string());
        log.append(&RunRecord::failure("1", "MSFT", 500.0, at(), &error)).unwrap();
        log.append(&RunRecord::failure("2", "MSFT", 700.0, at(), &error)).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.matches("user_id").count(), 1);
        assert!(text.starts_with(
            "user_id,timestamp,ticker,amount,best_model,rmse,mape,horizon,est_profit,status,error_msg"
        ));

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].user_id, "2");
        assert_eq!(records[1].status, RunStatus::Error);
    }
}

use chrono::NaiveDate;
use forecast_trade::data::{is_business_day, load_csv, read_csv, PriceSeries};
use forecast_trade::run_log::{RunLog, RunRecord, RunStatus};
use forecast_trade::{run_forecast_pipeline, ForecastError};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_read_csv_with_close_column() {
    let text = "Date,Close\n2024-03-04,10.0\n2024-03-05,10.5\n2024-03-07,11.0\n";
    let series = read_csv(text.as_bytes()).unwrap();

    assert_eq!(
        series.dates(),
        &[date(2024, 3, 4), date(2024, 3, 5), date(2024, 3, 6), date(2024, 3, 7)]
    );
    // The missing Wednesday repeats Tuesday's price
    assert_eq!(series.prices(), &[10.0, 10.5, 10.5, 11.0]);
}

#[test]
fn test_read_csv_unsorted_with_weekend_rows() {
    let text = "date,price\n2024-03-11,3.0\n2024-03-09,2.5\n2024-03-08,2.0\n";
    let series = read_csv(text.as_bytes()).unwrap();

    assert!(series.dates().iter().all(|d| is_business_day(*d)));
    assert_eq!(series.dates(), &[date(2024, 3, 8), date(2024, 3, 11)]);
    assert_eq!(series.prices(), &[2.0, 3.0]);
}

#[test]
fn test_read_csv_rejects_bad_rows() {
    let text = "date,price\n2024-03-04,abc\n";
    assert!(matches!(
        read_csv(text.as_bytes()),
        Err(ForecastError::CsvError(_))
    ));

    let text = "date,price\n2024-03-04,-1.0\n";
    assert!(matches!(
        read_csv(text.as_bytes()),
        Err(ForecastError::DataError(_))
    ));

    assert!(matches!(
        read_csv("date,price\n".as_bytes()),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_load_csv_and_run() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    let start = date(2023, 1, 2);
    let reference = PriceSeries::from_prices(
        start,
        (0..120)
            .map(|i| 50.0 + 3.0 * (i as f64 / 5.0).sin() + 0.05 * i as f64)
            .collect(),
    )
    .unwrap();
    for point in reference.iter() {
        writeln!(file, "{},{}", point.date, point.price).unwrap();
    }
    file.flush().unwrap();

    let series = load_csv(file.path()).unwrap();
    assert_eq!(series, reference);

    let result = run_forecast_pipeline(&series, 1000.0).unwrap();
    assert_eq!(result.last_price, reference.last_price());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = load_csv(dir.path().join("missing.csv"));
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_run_log_records_success_and_failure() {
    let dir = tempdir().unwrap();
    let log = RunLog::new(dir.path().join("logs.csv"));
    let at = date(2024, 2, 1).and_hms_opt(12, 0, 0).unwrap();

    let series = PriceSeries::from_prices(
        date(2023, 1, 2),
        (0..90).map(|i| 20.0 + (i % 7) as f64).collect(),
    )
    .unwrap();
    let result = run_forecast_pipeline(&series, 400.0).unwrap();
    log.append(&RunRecord::success("42", "TEST", 400.0, at, &result))
        .unwrap();

    let error = run_forecast_pipeline(&series, -1.0).unwrap_err();
    log.append(&RunRecord::failure("42", "TEST", -1.0, at, &error))
        .unwrap();

    let records = log.read_all().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].status, RunStatus::Ok);
    assert_eq!(records[0].best_model, result.best_model_name);
    assert_eq!(records[0].horizon, Some(30));
    assert_eq!(records[0].error_msg, "");

    assert_eq!(records[1].status, RunStatus::Error);
    assert_eq!(records[1].best_model, "");
    assert_eq!(records[1].rmse, None);
    assert!(records[1].error_msg.starts_with("Invalid parameter"));
}

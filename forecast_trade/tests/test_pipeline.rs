use approx::assert_relative_eq;
use chrono::NaiveDate;
use forecast_trade::config::PipelineConfig;
use forecast_trade::data::{next_business_day, PriceSeries};
use forecast_trade::error::{ForecastError, Result};
use forecast_trade::metrics::ForecastAccuracy;
use forecast_trade::models::{FittedModel, ForecastModel, ModelKind, TrainedForecastModel};
use forecast_trade::pipeline::{run_forecast_pipeline, ForecastPipeline};
use forecast_trade::selection::ModelSelector;
use forecast_trade::signals::SignalKind;
use forecast_trade::utils::synthetic_series;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn series(len: usize, seed: u64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    synthetic_series(len, start, seed).unwrap()
}

/// Trained model that replays a fixed path
#[derive(Debug)]
struct Replay(Vec<f64>);

impl TrainedForecastModel for Replay {
    fn forecast(&self, _history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        Ok(self.0.iter().copied().cycle().take(horizon).collect())
    }

    fn describe(&self) -> String {
        "replay".to_string()
    }
}

#[derive(Debug)]
struct ReplayModel(Vec<f64>);

impl ForecastModel for ReplayModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Smoothing
    }

    fn fit_eval(&self, _train: &[f64], _test: &[f64]) -> Result<FittedModel> {
        Ok(FittedModel::new(
            ModelKind::Smoothing,
            "replay",
            ForecastAccuracy {
                rmse: 1.0,
                mape: 1.0,
            },
            Box::new(Replay(self.0.clone())),
        ))
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let data = series(300, 42);
    let first = run_forecast_pipeline(&data, 1000.0).unwrap();
    let second = run_forecast_pipeline(&data, 1000.0).unwrap();

    assert_eq!(first.best_model_name, second.best_model_name);
    assert_eq!(first.forecast_curve, second.forecast_curve);
    assert_eq!(first, second);
}

#[test]
fn test_result_is_consistent() {
    let data = series(260, 8);
    let result = run_forecast_pipeline(&data, 2500.0).unwrap();

    let curve = &result.forecast_curve;
    assert_eq!(curve.horizon(), 30);
    assert_eq!(curve.dates()[0], next_business_day(data.last_date()));
    assert!(curve.values().iter().all(|v| v.is_finite()));

    let expected_change = (curve.last_value() - data.last_price()) / data.last_price() * 100.0;
    assert_relative_eq!(result.change_pct, expected_change);
    assert_relative_eq!(result.shares, 2500.0 / data.last_price());
    assert_relative_eq!(
        result.estimated_profit,
        result.trade_pairs.iter().map(|p| p.profit()).sum::<f64>()
    );

    let best = result
        .leaderboard
        .iter()
        .map(|s| s.accuracy.rmse)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(result.rmse, best);
    assert!(result
        .leaderboard
        .iter()
        .any(|s| s.name == result.best_model_name));
}

#[test]
fn test_shortest_accepted_series() {
    let result = run_forecast_pipeline(&series(70, 1), 1000.0).unwrap();
    assert_eq!(result.forecast_curve.horizon(), 30);

    let result = run_forecast_pipeline(&series(69, 1), 1000.0);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_configured_horizon() {
    let config = PipelineConfig {
        horizon: 10,
        ..PipelineConfig::default()
    };
    let result = ForecastPipeline::new(config)
        .unwrap()
        .run(&series(200, 4), 1000.0)
        .unwrap();
    assert_eq!(result.forecast_curve.horizon(), 10);
}

#[test]
fn test_config_from_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "horizon = 15").unwrap();
    writeln!(file, "arima_max_p = 1").unwrap();

    let config = PipelineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.horizon, 15);
    assert_eq!(config.arima_max_p, 1);
    assert_eq!(config.test_days, 60);

    let pipeline = ForecastPipeline::new(config).unwrap();
    assert_eq!(pipeline.config().horizon, 15);
}

#[test]
fn test_custom_forecaster_drives_signals_and_profit() {
    let selector = ModelSelector::new(vec![Box::new(ReplayModel(vec![
        100.0, 90.0, 110.0, 100.0,
    ]))]);
    let config = PipelineConfig {
        horizon: 4,
        ..PipelineConfig::default()
    };
    let pipeline = ForecastPipeline::with_selector(config, selector).unwrap();

    let data = PriceSeries::from_prices(
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        vec![100.0; 80],
    )
    .unwrap();
    let result = pipeline.run(&data, 1000.0).unwrap();

    assert_eq!(result.best_model_name, "replay");
    assert_eq!(result.forecast_curve.values(), &[100.0, 90.0, 110.0, 100.0]);
    let kinds: Vec<SignalKind> = result.signals.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SignalKind::Buy, SignalKind::Sell]);
    assert_eq!(result.trade_pairs.len(), 1);
    assert_eq!(result.estimated_profit, 200.0);
    assert_eq!(result.change_pct, 0.0);
}

#[test]
fn test_summary_and_json() {
    let result = run_forecast_pipeline(&series(180, 12), 1000.0).unwrap();

    let summary = result.to_string();
    assert!(summary.contains(&result.best_model_name));
    assert!(summary.contains("Estimated profit"));

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["best_model_name"], result.best_model_name.as_str());
    assert_eq!(
        json["forecast_curve"]["values"].as_array().unwrap().len(),
        30
    );
}

#[test]
fn test_invalid_amount() {
    for amount in [0.0, -5.0, f64::INFINITY] {
        let result = run_forecast_pipeline(&series(120, 2), amount);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }
}

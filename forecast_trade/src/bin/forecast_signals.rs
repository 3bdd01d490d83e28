//! Forecast a price series and print trading signals
//!
//! ```text
//! forecast_signals --input prices.csv --amount 1000 --ticker AAPL --log runs.csv
//! ```

use chrono::Local;
use clap::Parser;
use forecast_trade::data::load_csv;
use forecast_trade::error::Result;
use forecast_trade::run_log::{RunLog, RunRecord};
use forecast_trade::{ForecastError, ForecastPipeline, PipelineConfig, PipelineResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "forecast_signals",
    version,
    about = "Forecast prices, pick the best model and derive buy/sell signals"
)]
struct Cli {
    /// CSV file with `date` and `price` (or `close`) columns
    #[arg(short, long)]
    input: PathBuf,

    /// Amount invested per trade
    #[arg(short, long)]
    amount: f64,

    /// Ticker label for output and the run log
    #[arg(short, long, default_value = "UNKNOWN")]
    ticker: String,

    /// User identifier for the run log
    #[arg(long, default_value = "local")]
    user_id: String,

    /// TOML pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Forecast horizon in business days, overrides the configuration
    #[arg(long)]
    horizon: Option<usize>,

    /// Append a row for this run to a CSV log
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    Ok(config)
}

fn forecast(cli: &Cli) -> Result<PipelineResult> {
    let config = load_config(cli)?;
    let series = load_csv(&cli.input)?;
    info!(
        ticker = %cli.ticker,
        observations = series.len(),
        "loaded price series"
    );
    ForecastPipeline::new(config)?.run(&series, cli.amount)
}

fn write_log(cli: &Cli, record: &RunRecord) {
    if let Some(path) = &cli.log {
        if let Err(err) = RunLog::new(path).append(record) {
            error!(error = %err, path = %path.display(), "could not write run log");
        }
    }
}

fn print_result(cli: &Cli, result: &PipelineResult) -> Result<()> {
    if cli.json {
        println!("{}", result.to_json()?);
    } else {
        println!("{}", cli.ticker);
        println!("{}", result);
    }
    Ok(())
}

fn report_failure(cli: &Cli, err: &ForecastError) -> ExitCode {
    eprintln!("error: {err}");
    let now = Local::now().naive_local();
    write_log(
        cli,
        &RunRecord::failure(&cli.user_id, &cli.ticker, cli.amount, now, err),
    );
    ExitCode::from(err)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match forecast(&cli) {
        Ok(result) => {
            let now = Local::now().naive_local();
            write_log(
                &cli,
                &RunRecord::success(&cli.user_id, &cli.ticker, cli.amount, now, &result),
            );
            match print_result(&cli, &result) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::from(&err)
                }
            }
        }
        Err(err) => report_failure(&cli, &err),
    }
}

use approx::assert_relative_eq;
use chrono::NaiveDate;
use forecast_trade::data::business_days_after;
use forecast_trade::models::ForecastCurve;
use forecast_trade::profit::ProfitSimulator;
use forecast_trade::signals::{Signal, SignalExtractor, SignalKind};
use pretty_assertions::assert_eq;

fn last_close() -> NaiveDate {
    // A Friday
    NaiveDate::from_ymd_opt(2024, 6, 7).unwrap()
}

fn curve(values: &[f64]) -> ForecastCurve {
    ForecastCurve::new(business_days_after(last_close(), values.len()), values.to_vec()).unwrap()
}

#[test]
fn test_strict_neighbour_rule() {
    let signals = SignalExtractor::new().extract(&curve(&[2.0, 1.0, 3.0, 1.0, 2.0]));

    // Index 3 is also below both neighbours (3 and 2), so it is a second trough
    let summary: Vec<(usize, SignalKind, f64)> =
        signals.iter().map(|s| (s.index, s.kind, s.price)).collect();
    assert_eq!(
        summary,
        vec![
            (1, SignalKind::Buy, 1.0),
            (2, SignalKind::Sell, 3.0),
            (3, SignalKind::Buy, 1.0),
        ]
    );
}

#[test]
fn test_signal_dates_follow_the_curve() {
    let forecast = curve(&[5.0, 4.0, 6.0, 7.0, 3.0, 4.0]);
    let signals = SignalExtractor::new().extract(&forecast);

    for signal in &signals {
        assert_eq!(signal.date, forecast.dates()[signal.index]);
    }
    // Monday after the last close is the first forecast day
    assert_eq!(forecast.dates()[0], NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    assert_eq!(signals[0].date, NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
}

#[test]
fn test_monotonic_curve_has_no_signals() {
    let signals = SignalExtractor::new().extract(&curve(&[1.0, 2.0, 3.0, 4.0]));
    assert!(signals.is_empty());
}

#[test]
fn test_profit_of_one_pair() {
    let dates = business_days_after(last_close(), 3);
    let signals = [
        Signal {
            kind: SignalKind::Buy,
            date: dates[0],
            price: 90.0,
            index: 0,
        },
        Signal {
            kind: SignalKind::Sell,
            date: dates[2],
            price: 110.0,
            index: 2,
        },
    ];

    let simulator = ProfitSimulator::new(1000.0, 100.0).unwrap();
    assert_eq!(simulator.shares(), 10.0);

    let outcome = simulator.simulate(&signals);
    assert_eq!(outcome.profit, 200.0);
    assert_eq!(outcome.pairs.len(), 1);
    assert_eq!(outcome.pairs[0].buy.price, 90.0);
    assert_eq!(outcome.pairs[0].sell.price, 110.0);
}

#[test]
fn test_extracted_signals_feed_the_simulator() {
    let forecast = curve(&[10.0, 8.0, 12.0, 9.0, 7.0, 11.0, 10.0]);
    let signals = SignalExtractor::new().extract(&forecast);
    let outcome = ProfitSimulator::new(100.0, 10.0).unwrap().simulate(&signals);

    // BUY 8 -> SELL 12, BUY 7 -> SELL 11
    assert_eq!(outcome.pairs.len(), 2);
    assert_relative_eq!(outcome.profit, 80.0);
    assert_relative_eq!(
        outcome.profit,
        outcome.pairs.iter().map(|p| p.profit()).sum::<f64>()
    );
}

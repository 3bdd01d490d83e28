//! Utility functions for the forecast_trade crate

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Starting price of synthetic series
const SYNTHETIC_START_PRICE: f64 = 100.0;
/// Daily log-return drift of synthetic series
const SYNTHETIC_DRIFT: f64 = 0.0003;
/// Daily log-return volatility of synthetic series
const SYNTHETIC_VOLATILITY: f64 = 0.015;

/// Generate a deterministic geometric random walk with drift
///
/// The same `seed` always yields the same series. Dates are consecutive
/// business days from `start`.
pub fn synthetic_series(len: usize, start: NaiveDate, seed: u64) -> Result<PriceSeries> {
    if len == 0 {
        return Err(ForecastError::InvalidParameter(
            "Synthetic series length must be at least 1".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let returns = Normal::new(SYNTHETIC_DRIFT, SYNTHETIC_VOLATILITY)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

    let mut prices = Vec::with_capacity(len);
    let mut price = SYNTHETIC_START_PRICE;
    prices.push(price);
    for _ in 1..len {
        price *= returns.sample(&mut rng).exp();
        prices.push(price);
    }

    PriceSeries::from_prices(start, prices)
}

/// Round to `decimals` decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Keep at most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_series_is_reproducible() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let a = synthetic_series(50, start, 42).unwrap();
        let b = synthetic_series(50, start, 42).unwrap();
        let c = synthetic_series(50, start, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.prices(), c.prices());
        assert_eq!(a.prices()[0], 100.0);
        assert!(a.prices().iter().all(|p| *p > 0.0));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456789, 6), 1.234568);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("äöü", 2), "äö");
    }
}

//! Trading signals from a forecast curve
//!
//! A strict local minimum of the curve is a buy signal and a strict local
//! maximum is a sell signal. The first and last points have only one
//! neighbour and are never flagged.

use crate::models::ForecastCurve;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    /// Forecast trough
    Buy,
    /// Forecast peak
    Sell,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

/// A buy or sell point on the forecast curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Buy or sell
    pub kind: SignalKind,
    /// Forecast date
    pub date: NaiveDate,
    /// Forecast price at `date`
    pub price: f64,
    /// Position on the curve
    pub index: usize,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} @ {:.2}", self.kind, self.date, self.price)
    }
}

/// Finds peaks and troughs in forecast curves
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    /// Create an extractor
    pub fn new() -> Self {
        Self
    }

    /// Signals of `curve` in chronological order
    pub fn extract(&self, curve: &ForecastCurve) -> Vec<Signal> {
        let dates = curve.dates();
        let values = curve.values();
        extrema(values)
            .into_iter()
            .map(|(index, kind)| Signal {
                kind,
                date: dates[index],
                price: values[index],
                index,
            })
            .collect()
    }
}

/// Positions of strict local minima (buy) and maxima (sell), in order
pub fn extrema(values: &[f64]) -> Vec<(usize, SignalKind)> {
    values
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (prev, current, next) = (w[0], w[1], w[2]);
            if current < prev && current < next {
                Some((i + 1, SignalKind::Buy))
            } else if current > prev && current > next {
                Some((i + 1, SignalKind::Sell))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_never_flagged() {
        // Global min and max sit on the ends
        assert!(extrema(&[0.0, 1.0, 2.0, 3.0]).is_empty());
        assert!(extrema(&[5.0, 3.0, 4.0, 9.0])
            .iter()
            .all(|(index, _)| *index != 0 && *index != 3));
    }

    #[test]
    fn test_plateaus_are_not_extrema() {
        assert!(extrema(&[1.0, 2.0, 2.0, 1.0]).is_empty());
        assert!(extrema(&[3.0, 1.0, 1.0, 3.0]).is_empty());
    }

    #[test]
    fn test_short_curves() {
        assert!(extrema(&[]).is_empty());
        assert!(extrema(&[1.0]).is_empty());
        assert!(extrema(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_signal_kind_display() {
        assert_eq!(SignalKind::Buy.to_string(), "BUY");
        assert_eq!(SignalKind::Sell.to_string(), "SELL");
    }
}

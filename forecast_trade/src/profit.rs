//! Profit simulation over trading signals
//!
//! A fixed number of shares, `amount / current_price`, is bought at every
//! buy signal that is followed by a sell and sold at that sell. Buys seen
//! while waiting for a sell are ignored, as is a final buy with no sell.

use crate::error::{ForecastError, Result};
use crate::signals::{Signal, SignalKind};
use serde::Serialize;

/// A buy signal matched with the next sell signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePair {
    /// Entry signal
    pub buy: Signal,
    /// Exit signal
    pub sell: Signal,
    /// Shares traded
    pub shares: f64,
}

impl TradePair {
    /// Realised profit of the pair
    pub fn profit(&self) -> f64 {
        (self.sell.price - self.buy.price) * self.shares
    }
}

impl std::fmt::Display for TradePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BUY {} @ {:.2} -> SELL {} @ {:.2}: {:+.2}",
            self.buy.date,
            self.buy.price,
            self.sell.date,
            self.sell.price,
            self.profit()
        )
    }
}

/// Result of a simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// Total realised profit
    pub profit: f64,
    /// Matched pairs in chronological order
    pub pairs: Vec<TradePair>,
    /// Shares traded per pair
    pub shares: f64,
}

/// Greedy buy-then-sell simulator
#[derive(Debug, Clone, Copy)]
pub struct ProfitSimulator {
    amount: f64,
    current_price: f64,
}

impl ProfitSimulator {
    /// Simulate investing `amount` at the last actual price `current_price`
    pub fn new(amount: f64, current_price: f64) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Amount must be a positive number, got {}",
                amount
            )));
        }
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Current price must be a positive number, got {}",
                current_price
            )));
        }

        Ok(Self {
            amount,
            current_price,
        })
    }

    /// Shares bought per trade
    pub fn shares(&self) -> f64 {
        self.amount / self.current_price
    }

    /// Pair each buy with the next sell and total the profit
    pub fn simulate(&self, signals: &[Signal]) -> SimulationOutcome {
        let shares = self.shares();
        let mut pairs = Vec::new();
        let mut open: Option<Signal> = None;

        for signal in signals {
            match (signal.kind, open) {
                (SignalKind::Buy, None) => open = Some(*signal),
                (SignalKind::Sell, Some(buy)) => {
                    pairs.push(TradePair {
                        buy,
                        sell: *signal,
                        shares,
                    });
                    open = None;
                }
                // A buy while holding, or a sell with nothing to sell
                _ => {}
            }
        }

        let profit = pairs.iter().map(TradePair::profit).sum();
        SimulationOutcome {
            profit,
            pairs,
            shares,
        }
    }
}

//! Price series handling
//!
//! A [`PriceSeries`] is the only input of the forecasting pipeline: one
//! positive closing price per business day, dates strictly ascending with
//! no gaps. Raw observations (e.g. from a CSV export) are brought onto the
//! business-day calendar by [`PriceSeries::from_observations`].

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A single dated price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date
    #[serde(alias = "Date", alias = "timestamp")]
    pub date: NaiveDate,
    /// Closing price
    #[serde(alias = "close", alias = "Close", alias = "Price")]
    pub price: f64,
}

/// Business-day price series
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Create a series from parallel date and price vectors
    ///
    /// Dates must be strictly ascending and prices finite and positive.
    pub fn new(dates: Vec<NaiveDate>, prices: Vec<f64>) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match prices length ({})",
                dates.len(),
                prices.len()
            )));
        }
        if dates.is_empty() {
            return Err(ForecastError::DataError("Empty price series".to_string()));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly ascending: {} is followed by {}",
                pair[0], pair[1]
            )));
        }
        if let Some((i, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(ForecastError::DataError(format!(
                "Price on {} must be a positive number, got {}",
                dates[i], price
            )));
        }

        Ok(Self { dates, prices })
    }

    /// Create a series of consecutive business days starting at `start`
    ///
    /// A weekend `start` rolls forward to the following Monday.
    pub fn from_prices(start: NaiveDate, prices: Vec<f64>) -> Result<Self> {
        let first = if is_business_day(start) {
            start
        } else {
            next_business_day(start)
        };
        let mut dates = Vec::with_capacity(prices.len());
        let mut current = first;
        for _ in 0..prices.len() {
            dates.push(current);
            current = next_business_day(current);
        }

        Self::new(dates, prices)
    }

    /// Clean raw observations into a business-day series
    ///
    /// Observations are sorted by date (a later duplicate replaces an
    /// earlier one), then every business day from the first observation to
    /// the last is filled with the most recent price at or before it.
    pub fn from_observations(mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::DataError("No price observations".to_string()));
        }
        points.sort_by_key(|p| p.date);
        points.dedup_by(|later, earlier| {
            if later.date == earlier.date {
                earlier.price = later.price;
                true
            } else {
                false
            }
        });

        let first = points[0].date;
        let last = points[points.len() - 1].date;
        let mut day = if is_business_day(first) {
            first
        } else {
            next_business_day(first)
        };

        let mut dates = Vec::new();
        let mut prices = Vec::new();
        let mut cursor = 0;
        while day <= last {
            while cursor + 1 < points.len() && points[cursor + 1].date <= day {
                cursor += 1;
            }
            dates.push(day);
            prices.push(points[cursor].price);
            day = next_business_day(day);
        }

        Self::new(dates, prices)
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed prices
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Date of the most recent observation
    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Most recent observed price
    pub fn last_price(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Iterate over `(date, price)` pairs
    pub fn iter(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.dates
            .iter()
            .zip(&self.prices)
            .map(|(&date, &price)| PricePoint { date, price })
    }
}

/// Check if a date falls on Monday to Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first business day strictly after `date`
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while !is_business_day(next) {
        next = next + Duration::days(1);
    }
    next
}

/// The `count` business days following `date`
///
/// Exchange holidays are not modelled; every weekday is a trading day.
pub fn business_days_after(date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = date;
    for _ in 0..count {
        current = next_business_day(current);
        days.push(current);
    }
    days
}

/// Read `date,price` (or `date,close`) rows from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<PriceSeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for record in csv_reader.deserialize() {
        let point: PricePoint = record?;
        points.push(point);
    }

    PriceSeries::from_observations(points)
}

/// Load a price series from a CSV file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    let file = File::open(path)?;
    read_csv(file)
}

//! Option quote data
//!
//! Normalized market records handed to the surface builder by whatever
//! market-data source is plugged in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::option::{OptionContract, OptionType};

/// Days per year used to turn days-to-expiry into a year fraction
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Whole days from `now` until midnight of `expiry`, floored.
///
/// An expiry later today counts as 0 days; a past one is negative.
pub fn days_to_expiry(expiry: NaiveDate, now: NaiveDateTime) -> i64 {
    let expiry_start = expiry.and_time(chrono::NaiveTime::MIN);
    (expiry_start - now).num_seconds().div_euclid(86_400)
}

/// Option market quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Strike price
    pub strike: f64,
    /// Call or put
    pub option_type: OptionType,
    /// Expiration date
    pub expiry_date: NaiveDate,
    /// Whole days until expiry
    pub days_to_expiry: i64,
    /// Years until expiry (days / 365)
    pub time_to_expiry: f64,
    /// Last traded price
    pub last_price: f64,
    /// Strike / spot at fetch time
    pub moneyness: f64,
}

impl OptionQuote {
    /// Build a quote, deriving time to expiry and moneyness
    pub fn new(
        strike: f64,
        option_type: OptionType,
        expiry_date: NaiveDate,
        days_to_expiry: i64,
        last_price: f64,
        spot: f64,
    ) -> Self {
        Self {
            strike,
            option_type,
            expiry_date,
            days_to_expiry,
            time_to_expiry: days_to_expiry as f64 / DAYS_PER_YEAR,
            last_price,
            moneyness: strike / spot,
        }
    }

    /// Pricer inputs for this quote; volatility is left at zero for the solver
    pub fn contract(&self, spot: f64, rate: f64, dividend_yield: f64) -> OptionContract {
        OptionContract::new(spot, self.strike, self.time_to_expiry, rate, 0.0, dividend_yield)
    }
}

/// All quotes fetched for one underlying in a single request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    /// Underlying symbol
    pub symbol: String,
    /// Spot price at fetch time
    pub spot: f64,
    /// Calls and puts across all expiries
    pub quotes: Vec<OptionQuote>,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl OptionChainSnapshot {
    pub fn new(symbol: impl Into<String>, spot: f64) -> Self {
        Self {
            symbol: symbol.into(),
            spot,
            quotes: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn push(&mut self, quote: OptionQuote) {
        self.quotes.push(quote);
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Quotes for one side
    pub fn side(&self, option_type: OptionType) -> impl Iterator<Item = &OptionQuote> {
        self.quotes.iter().filter(move |q| q.option_type == option_type)
    }

    /// Distinct expiries, ascending
    pub fn expiries(&self) -> Vec<NaiveDate> {
        let mut expiries: Vec<NaiveDate> = self.quotes.iter().map(|q| q.expiry_date).collect();
        expiries.sort();
        expiries.dedup();
        expiries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_days_to_expiry_floors() {
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();

        assert_eq!(days_to_expiry(expiry, at("2025-06-17", "00:00:00")), 3);
        // Part of a day already gone: 2 days and change
        assert_eq!(days_to_expiry(expiry, at("2025-06-17", "10:30:00")), 2);
        // Expiring today, after midnight
        assert_eq!(days_to_expiry(expiry, at("2025-06-20", "09:00:00")), -1);
    }

    #[test]
    fn test_quote_derived_fields() {
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let quote = OptionQuote::new(145.0, OptionType::Call, expiry, 73, 6.8, 140.0);

        assert!((quote.time_to_expiry - 0.2).abs() < 1e-12);
        assert!((quote.moneyness - 145.0 / 140.0).abs() < 1e-12);

        let contract = quote.contract(140.0, 0.05, 0.01);
        assert_eq!(contract.strike, 145.0);
        assert_eq!(contract.spot, 140.0);
        assert_eq!(contract.volatility, 0.0);
    }

    #[test]
    fn test_snapshot_sides_and_expiries() {
        let e1 = NaiveDate::from_ymd_opt(2025, 2, 21).unwrap();
        let e2 = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();

        let mut chain = OptionChainSnapshot::new("AAPL", 140.0);
        chain.push(OptionQuote::new(140.0, OptionType::Call, e1, 30, 5.0, 140.0));
        chain.push(OptionQuote::new(140.0, OptionType::Put, e2, 10, 3.0, 140.0));
        chain.push(OptionQuote::new(145.0, OptionType::Put, e1, 30, 7.0, 140.0));

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.side(OptionType::Put).count(), 2);
        assert_eq!(chain.expiries(), vec![e2, e1]);
    }
}

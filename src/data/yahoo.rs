//! Yahoo Finance data fetcher
//!
//! Spot, company info, one month of daily closes and full option chains,
//! normalized into [`OptionQuote`] records for the surface builder.
//!
//! Note: Yahoo Finance's API is unofficial and delayed; it is used here as a
//! replaceable collaborator behind [`OptionChainSource`].

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::OptionChainSource;
use crate::core::{
    days_to_expiry, OptionChainSnapshot, OptionQuote, OptionType, PricerError, PricerResult,
};

/// Trading days used to annualize daily return volatility
pub const TRADING_DAYS: f64 = 252.0;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(timeout: Duration) -> PricerResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> PricerResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(timeout)
            .build()
            .map_err(|e| PricerError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> PricerResult<T> {
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PricerError::network(e.to_string()))?
            .json()
            .map_err(|e| PricerError::data(format!("failed to parse {}: {}", url, e)))
    }

    fn quote_data(&self, symbol: &str) -> PricerResult<YahooQuoteData> {
        let url = format!("{}/v7/finance/quote?symbols={}", self.base_url, symbol);
        let response: YahooQuoteResponse = self.get_json(&url)?;

        response
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| PricerError::data(format!("no quote data returned for {}", symbol)))
    }

    /// Daily closes over the last month, oldest first
    pub fn daily_closes(&self, symbol: &str) -> PricerResult<Vec<f64>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1mo&interval=1d",
            self.base_url, symbol
        );
        let response: YahooChartResponse = self.get_json(&url)?;

        let closes = response
            .chart
            .result
            .into_iter()
            .next()
            .and_then(|r| r.indicators.quote.into_iter().next())
            .map(|q| q.close.into_iter().flatten().collect())
            .unwrap_or_default();

        Ok(closes)
    }

    /// Spot, name, realized vol and dividend yield
    pub fn stock_snapshot(&self, symbol: &str) -> PricerResult<StockSnapshot> {
        let quote = self.quote_data(symbol)?;
        let closes = match self.daily_closes(symbol) {
            Ok(closes) => closes,
            Err(e) => {
                tracing::warn!("no price history for {}: {}", symbol, e);
                Vec::new()
            }
        };

        Ok(StockSnapshot::from_parts(symbol, &quote, &closes))
    }

    /// Spot price only
    pub fn spot_price(&self, symbol: &str) -> PricerResult<f64> {
        let quote = self.quote_data(symbol)?;
        quote
            .regular_market_price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| PricerError::data(format!("no market price for {}", symbol)))
    }

    /// Available option expirations as raw Yahoo timestamps
    pub fn expirations(&self, symbol: &str) -> PricerResult<Vec<i64>> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, symbol);
        let response: YahooOptionsResponse = self.get_json(&url)?;

        let chain = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| PricerError::data(format!("no options data returned for {}", symbol)))?;

        Ok(chain.expiration_dates)
    }

    /// Quotes for one expiration
    fn expiry_quotes(
        &self,
        symbol: &str,
        expiry_ts: i64,
        spot: f64,
        now: NaiveDateTime,
    ) -> PricerResult<Vec<OptionQuote>> {
        let url = format!(
            "{}/v7/finance/options/{}?date={}",
            self.base_url, symbol, expiry_ts
        );
        let response: YahooOptionsResponse = self.get_json(&url)?;

        let chain_data = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| PricerError::data("no options data returned"))?;

        let expiry = expiry_date(expiry_ts)?;
        Ok(chain_data
            .options
            .first()
            .map(|options| normalize_options(options, expiry, spot, now))
            .unwrap_or_default())
    }
}

impl OptionChainSource for YahooClient {
    fn option_chain(&self, symbol: &str) -> PricerResult<OptionChainSnapshot> {
        let spot = self.spot_price(symbol)?;
        let expirations = self.expirations(symbol)?;
        let now = Local::now().naive_local();

        let mut snapshot = OptionChainSnapshot::new(symbol, spot);
        for ts in expirations {
            match self.expiry_quotes(symbol, ts, spot, now) {
                Ok(quotes) => snapshot.quotes.extend(quotes),
                Err(e) => {
                    tracing::warn!("failed to get chain for {} expiry {}: {}", symbol, ts, e);
                }
            }
        }

        tracing::info!(
            "fetched {} option quotes for {} across {} expiries",
            snapshot.len(),
            symbol,
            snapshot.expiries().len()
        );
        Ok(snapshot)
    }
}

fn expiry_date(ts: i64) -> PricerResult<NaiveDate> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| PricerError::data(format!("invalid expiration timestamp {}", ts)))
}

/// Convert one Yahoo expiry block into quotes, skipping rows without a strike
fn normalize_options(
    options: &YahooOptions,
    expiry: NaiveDate,
    spot: f64,
    now: NaiveDateTime,
) -> Vec<OptionQuote> {
    let days = days_to_expiry(expiry, now);

    let side = |rows: &[YahooOptionData], option_type: OptionType| -> Vec<OptionQuote> {
        rows.iter()
            .filter_map(|row| {
                let strike = row.strike?;
                let last_price = row.last_price.unwrap_or(0.0);
                Some(OptionQuote::new(strike, option_type, expiry, days, last_price, spot))
            })
            .collect()
    };

    let mut quotes = side(&options.calls, OptionType::Call);
    quotes.extend(side(&options.puts, OptionType::Put));
    quotes
}

/// Underlying summary used to seed pricing inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub company_name: String,
    pub current_price: f64,
    /// Annualized realized volatility of daily closes
    pub volatility: f64,
    /// Decimal fraction (0.0044 = 0.44%)
    pub dividend_yield: f64,
}

impl StockSnapshot {
    /// Zeros with the ticker as name, for when the provider is unreachable
    pub fn fallback(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            company_name: symbol.to_string(),
            current_price: 0.0,
            volatility: 0.0,
            dividend_yield: 0.0,
        }
    }

    fn from_parts(symbol: &str, quote: &YahooQuoteData, closes: &[f64]) -> Self {
        let company_name = [quote.long_name.as_deref(), quote.short_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty() && *name != symbol)
            .unwrap_or(symbol)
            .to_string();

        let current_price = quote
            .regular_market_price
            .filter(|p| *p > 0.0)
            .or_else(|| closes.last().copied())
            .unwrap_or(0.0);

        Self {
            symbol: symbol.to_string(),
            company_name,
            current_price,
            volatility: historical_volatility(closes),
            dividend_yield: quote.dividend_yield.map(normalize_dividend_yield).unwrap_or(0.0),
        }
    }
}

/// Provider reports dividend yield in percent; pricing wants a fraction
pub fn normalize_dividend_yield(percent: f64) -> f64 {
    percent / 100.0
}

/// Annualized sample std-dev of close-to-close percentage changes.
///
/// Returns 0 when there are fewer than two returns.
pub fn historical_volatility(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    returns.iter().std_dev() * TRADING_DAYS.sqrt()
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResult {
    result: Vec<YahooQuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuoteData {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Vec<YahooChartResult>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<YahooOptionData>,
    #[serde(default)]
    puts: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    strike: Option<f64>,
    #[serde(rename = "lastPrice")]
    last_price: Option<f64>,
}

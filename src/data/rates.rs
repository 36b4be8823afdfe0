//! Risk-free rates
//!
//! Treasury yields from FRED, picked by the maturity closest to the option's
//! time to expiry. The client is built explicitly from config and passed in
//! wherever a rate is needed; [`FlatRate`] stands in offline.

use std::time::Duration;

use chrono::Local;
use serde::Deserialize;

use crate::core::{PricerError, PricerResult};

/// Rate used whenever the series is empty or unreachable
pub const FALLBACK_RATE: f64 = 0.05;

/// Calendar days of observations to look back over
const LOOKBACK_DAYS: i64 = 7;

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Maturity in years -> FRED series, in lookup priority order
pub const TREASURY_SERIES: [(f64, &str); 12] = [
    (1.0 / 12.0, "DTB4WK"),
    (2.0 / 12.0, "DTB4WK"),
    (3.0 / 12.0, "DTB3"),
    (6.0 / 12.0, "DTB6"),
    (1.0, "DGS1"),
    (2.0, "DGS2"),
    (3.0, "DGS3"),
    (5.0, "DGS5"),
    (7.0, "DGS7"),
    (10.0, "DGS10"),
    (20.0, "DGS20"),
    (30.0, "DGS30"),
];

/// Source of a continuously-compounded risk-free rate for a maturity
pub trait RateSource {
    /// Decimal rate for `maturity_years`; never fails, falls back instead
    fn risk_free_rate(&self, maturity_years: f64) -> f64;
}

/// Same rate for every maturity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRate(pub f64);

impl RateSource for FlatRate {
    fn risk_free_rate(&self, _maturity_years: f64) -> f64 {
        self.0
    }
}

/// Series whose maturity is closest to `maturity_years`; earlier entry on ties
pub fn closest_series(maturity_years: f64) -> &'static str {
    let mut best = TREASURY_SERIES[0];
    for entry in TREASURY_SERIES.iter().skip(1) {
        if (entry.0 - maturity_years).abs() < (best.0 - maturity_years).abs() {
            best = *entry;
        }
    }
    best.1
}

/// FRED observations client
pub struct FredClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    fallback_rate: f64,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> PricerResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PricerError::config("FRED API key is empty"));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PricerError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            fallback_rate: FALLBACK_RATE,
        })
    }

    pub fn with_fallback_rate(mut self, rate: f64) -> Self {
        self.fallback_rate = rate;
        self
    }

    /// Latest observation of `series_id` in the lookback window, as a decimal
    pub fn latest_rate(&self, series_id: &str) -> PricerResult<Option<f64>> {
        let end = Local::now().date_naive();
        let start = (end - chrono::Duration::days(LOOKBACK_DAYS)).to_string();
        let end = end.to_string();

        let url = format!("{}/series/observations", self.base_url);
        let response: FredObservations = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PricerError::network(e.to_string()))?
            .json()
            .map_err(|e| PricerError::data(format!("failed to parse FRED response: {}", e)))?;

        Ok(response.latest_percent().map(|pct| pct / 100.0))
    }
}

impl RateSource for FredClient {
    fn risk_free_rate(&self, maturity_years: f64) -> f64 {
        let series_id = closest_series(maturity_years);
        match self.latest_rate(series_id) {
            Ok(Some(rate)) => {
                tracing::debug!("{} = {:.4}", series_id, rate);
                rate
            }
            Ok(None) => {
                tracing::warn!("no recent {} observations, using {}", series_id, self.fallback_rate);
                self.fallback_rate
            }
            Err(e) => {
                tracing::warn!("error fetching risk-free rate {}: {}", series_id, e);
                self.fallback_rate
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct FredObservations {
    #[serde(default)]
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    /// Percent, or "." when missing
    value: String,
}

impl FredObservations {
    fn latest_percent(&self) -> Option<f64> {
        self.observations
            .iter()
            .rev()
            .find_map(|o| o.value.parse::<f64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_series() {
        assert_eq!(closest_series(0.1), "DTB4WK");
        assert_eq!(closest_series(0.25), "DTB3");
        assert_eq!(closest_series(1.0), "DGS1");
        assert_eq!(closest_series(8.0), "DGS7");
        assert_eq!(closest_series(50.0), "DGS30");
    }

    #[test]
    fn test_closest_series_ties_go_to_earlier_entry() {
        assert_eq!(closest_series(1.5), "DGS1");
        assert_eq!(closest_series(4.0), "DGS3");
    }

    #[test]
    fn test_latest_observation_skips_missing() {
        let json = r#"{"observations": [
            {"date": "2025-01-02", "value": "4.31"},
            {"date": "2025-01-03", "value": "4.33"},
            {"date": "2025-01-06", "value": "."}
        ]}"#;
        let obs: FredObservations = serde_json::from_str(json).unwrap();
        assert_eq!(obs.latest_percent(), Some(4.33));

        let empty: FredObservations = serde_json::from_str(r#"{"observations": []}"#).unwrap();
        assert_eq!(empty.latest_percent(), None);
    }

    #[test]
    fn test_flat_rate() {
        assert_eq!(FlatRate(0.042).risk_free_rate(10.0), 0.042);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(FredClient::new("  ", Duration::from_secs(1)).is_err());
    }

    #[test]
    #[ignore] // Requires network and FRED_API_KEY
    fn test_live_rate() {
        let key = std::env::var("FRED_API_KEY").unwrap();
        let client = FredClient::new(key, Duration::from_secs(10)).unwrap();
        let rate = client.risk_free_rate(1.0);
        println!("1y rate: {}", rate);
        assert!(rate > -0.01 && rate < 0.2);
    }
}

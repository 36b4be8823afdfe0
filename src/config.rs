//! Runtime configuration from the environment (and an optional `.env`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::{PricerError, PricerResult};
use crate::data::{CacheConfig, FALLBACK_RATE};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// FRED key; without it the fallback rate is used everywhere
    pub fred_api_key: Option<String>,
    pub default_ticker: String,
    pub fallback_rate: f64,
    pub cache_dir: PathBuf,
    pub cache_max_age_hours: i64,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            default_ticker: "AAPL".to_string(),
            fallback_rate: FALLBACK_RATE,
            cache_dir: PathBuf::from("./data/cache"),
            cache_max_age_hours: 24,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> PricerResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PricerResult<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let fallback_rate: f64 = parse("PRICER_FALLBACK_RATE", &var_or("PRICER_FALLBACK_RATE", "0.05"))?;
        if !fallback_rate.is_finite() {
            return Err(PricerError::config("PRICER_FALLBACK_RATE must be finite"));
        }

        let cache_max_age_hours: i64 =
            parse("PRICER_CACHE_MAX_AGE_HOURS", &var_or("PRICER_CACHE_MAX_AGE_HOURS", "24"))?;

        let timeout_secs: u64 =
            parse("PRICER_HTTP_TIMEOUT_SECS", &var_or("PRICER_HTTP_TIMEOUT_SECS", "10"))?;

        Ok(Self {
            fred_api_key: lookup("FRED_API_KEY").filter(|k| !k.trim().is_empty()),
            default_ticker: var_or("PRICER_TICKER", "AAPL").to_ascii_uppercase(),
            fallback_rate,
            cache_dir: PathBuf::from(var_or("PRICER_CACHE_DIR", "./data/cache")),
            cache_max_age_hours,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            cache_dir: self.cache_dir.clone(),
            max_age_hours: self.cache_max_age_hours,
            enabled: self.cache_max_age_hours > 0,
        }
    }
}

fn parse<T>(key: &str, value: &str) -> PricerResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| PricerError::config(format!("{key}: {e}")))
}

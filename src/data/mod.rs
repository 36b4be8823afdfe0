//! Market data fetching and storage
//!
//! Handles:
//! - Yahoo Finance for spot, history and option chains (free, delayed)
//! - FRED for treasury yields used as the risk-free rate
//! - Local caching of option chains

pub mod cache;
pub mod rates;
pub mod yahoo;

pub use cache::*;
pub use rates::*;
pub use yahoo::*;

use crate::core::{OptionChainSnapshot, PricerResult, SurfacePair};
use crate::models::{build_surface, SurfaceConfig};

/// Anything that can hand back a normalized option chain
pub trait OptionChainSource {
    fn option_chain(&self, symbol: &str) -> PricerResult<OptionChainSnapshot>;
}

/// Fetch a chain and build both surfaces, returning them with the spot used.
///
/// Upstream failures never escape: they are logged and give an empty pair
/// with spot 0, so a dashboard can keep rendering.
pub fn volatility_surface(
    source: &dyn OptionChainSource,
    symbol: &str,
    rate: f64,
    dividend_yield: f64,
    config: &SurfaceConfig,
) -> (SurfacePair, f64) {
    let chain = match source.option_chain(symbol) {
        Ok(chain) => chain,
        Err(e) => {
            tracing::warn!("could not fetch option chain for {}: {}", symbol, e);
            return (SurfacePair::empty(), 0.0);
        }
    };

    if chain.is_empty() {
        tracing::warn!("no option quotes for {}", symbol);
        return (SurfacePair::empty(), chain.spot);
    }

    let surfaces = build_surface(&chain.quotes, chain.spot, rate, dividend_yield, config);
    (surfaces, chain.spot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionContract, OptionQuote, OptionType, PricerError};
    use crate::models::black_scholes;
    use chrono::NaiveDate;

    struct StaticSource(Option<OptionChainSnapshot>);

    impl OptionChainSource for StaticSource {
        fn option_chain(&self, _symbol: &str) -> PricerResult<OptionChainSnapshot> {
            self.0.clone().ok_or_else(|| PricerError::network("timeout"))
        }
    }

    fn chain() -> OptionChainSnapshot {
        let spot = 100.0;
        let expiry = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
        let mut chain = OptionChainSnapshot::new("TEST", spot);
        for (strike, side) in [(100.0, OptionType::Call), (95.0, OptionType::Put)] {
            // 0.01 + 19 * step lands exactly on the solver grid
            let vol = 0.01 + 19.0 * (1.99 / 99.0);
            let contract = OptionContract::new(spot, strike, 73.0 / 365.0, 0.05, vol, 0.0);
            let price = black_scholes::price(&contract, side).unwrap();
            chain.push(OptionQuote::new(strike, side, expiry, 73, price, spot));
        }
        chain
    }

    #[test]
    fn test_surface_from_source() {
        let source = StaticSource(Some(chain()));
        let (pair, spot) =
            volatility_surface(&source, "TEST", 0.05, 0.0, &SurfaceConfig::default());

        assert_eq!(spot, 100.0);
        assert_eq!(pair.call.as_ref().unwrap().len(), 1);
        assert_eq!(pair.put.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_upstream_failure_gives_empty_pair() {
        let source = StaticSource(None);
        let (pair, spot) =
            volatility_surface(&source, "TEST", 0.05, 0.0, &SurfaceConfig::default());

        assert!(pair.is_empty());
        assert_eq!(spot, 0.0);
    }

    #[test]
    fn test_empty_chain_keeps_spot() {
        let source = StaticSource(Some(OptionChainSnapshot::new("TEST", 42.0)));
        let (pair, spot) =
            volatility_surface(&source, "TEST", 0.05, 0.0, &SurfaceConfig::default());

        assert!(pair.is_empty());
        assert_eq!(spot, 42.0);
    }
}

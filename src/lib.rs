//! # Options Pricer - Black-Scholes-Merton Analytics
//!
//! European option pricing with continuous dividend yield, sensitivities,
//! implied volatility recovery and implied volatility surfaces built from
//! market option chains.
//!
//! ## Key Components
//!
//! - **Black-Scholes-Merton**: Closed-form prices and the five Greeks
//! - **Implied Vol**: Bounded grid search with a trust check on the fit
//! - **IV Surface**: Per-side sparse (days x moneyness/strike) grids
//! - **Scenarios**: PnL heatmaps, Greeks profiles, hold-to-expiry PnL
//! - **Data Fetching**: Yahoo Finance chains and FRED treasury rates
//!
//! ## Usage
//!
//! ```rust,no_run
//! use options_pricer::prelude::*;
//!
//! let contract = OptionContract::new(100.0, 100.0, 1.0, 0.05, 0.2, 0.0);
//! let call = bs_price(&contract, OptionType::Call).unwrap();
//! let greeks = bs_greeks(&contract).unwrap();
//!
//! let iv = implied_volatility(call, &contract, OptionType::Call).unwrap();
//! println!("call {:.4} delta {:.4} iv {:.2}", call, greeks.call.delta, iv);
//! ```
//!
//! ## What This Library Does NOT Do
//!
//! - Price American exercise (European only)
//! - Interpolate or smooth the surface between observed cells
//! - Guarantee data quality from free, delayed market-data providers

pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        days_to_expiry, Greeks, GreeksResult, OptionChainSnapshot, OptionContract, OptionQuote,
        OptionType, PricerError, PricerResult, SurfaceAxis, SurfaceGrid, SurfacePair,
        VolSurfacePoint,
    };

    // Config
    pub use crate::config::AppConfig;

    // Data fetching
    pub use crate::data::{
        volatility_surface, CacheConfig, CachedChainSource, DataCache, FlatRate, FredClient,
        OptionChainSource, RateSource, StockSnapshot, YahooClient,
    };

    // Models
    pub use crate::models::{
        build_surface,
        build_surface_for_chain,
        greeks as bs_greeks,
        implied_volatility,
        implied_volatility_with,
        norm_cdf,
        norm_pdf,

        // Black-Scholes
        price as bs_price,
        prices as bs_prices,
        SolverConfig,
        SurfaceConfig,
    };

    // Scenarios
    pub use crate::pricing::{
        expiry_pnl, greeks_profile, pnl_heatmap, ExpiryPnl, PnlHeatmap, PricingStatus,
        ScenarioConfig, FAIR_PRICE_THRESHOLD,
    };
}

// Re-export main types at crate root
pub use crate::core::{PricerError, PricerResult};
pub use crate::models::{build_surface, implied_volatility, SurfaceConfig};

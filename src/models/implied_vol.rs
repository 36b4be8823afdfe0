//! Implied volatility solver
//!
//! Exhaustive grid search over a bounded volatility range rather than
//! Newton-Raphson: illiquid quotes produce flat or noisy objectives near zero
//! vega where a root-finder stalls, while a fixed scan always terminates.
//!
//! The scan keeps a pre-seeded incumbent and only replaces it on a strictly
//! smaller absolute price error, so ties resolve to the lowest volatility
//! seen first.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::black_scholes::price_unchecked;
use crate::core::{OptionContract, OptionType, PricerError, PricerResult};

/// Solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Lower end of the volatility search range
    /// Default: 0.01
    pub min_vol: f64,

    /// Upper end of the volatility search range
    /// Default: 2.0
    pub max_vol: f64,

    /// Evenly spaced candidates in [min_vol, max_vol]
    /// Default: 100
    pub grid_points: usize,

    /// Incumbent evaluated before the scan
    /// Default: 0.5
    pub seed_vol: f64,

    /// Observed prices below this are too noisy to invert
    /// Default: 0.01
    pub min_price: f64,

    /// Reject when best error > this fraction of the observed price
    /// Default: 0.10
    pub max_relative_error: f64,

    /// Golden-section steps around the grid winner (0 = pure grid)
    /// Default: 0
    pub refine_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_vol: 0.01,
            max_vol: 2.0,
            grid_points: 100,
            seed_vol: 0.5,
            min_price: 0.01,
            max_relative_error: 0.10,
            refine_iterations: 0,
        }
    }
}

impl SolverConfig {
    /// Grid search followed by local refinement
    pub fn refined() -> Self {
        Self {
            refine_iterations: 40,
            ..Default::default()
        }
    }

    /// Spacing between grid candidates
    pub fn grid_step(&self) -> f64 {
        if self.grid_points < 2 {
            return 0.0;
        }
        (self.max_vol - self.min_vol) / (self.grid_points - 1) as f64
    }

    /// Candidate volatilities in increasing order
    pub fn candidates(&self) -> Array1<f64> {
        Array1::linspace(self.min_vol, self.max_vol, self.grid_points)
    }
}

/// Best candidate found by the search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolFit {
    pub vol: f64,
    /// |model price - observed price| at `vol`
    pub error: f64,
}

/// Implied volatility with the default grid
pub fn implied_volatility(
    observed_price: f64,
    contract: &OptionContract,
    option_type: OptionType,
) -> PricerResult<f64> {
    implied_volatility_with(observed_price, contract, option_type, &SolverConfig::default())
}

/// Implied volatility for `observed_price`.
///
/// The contract's own `volatility` field is ignored. Returns
/// [`PricerError::NotFound`] when the price is below `min_price` or the best
/// fit misses by more than `max_relative_error` of the price, and
/// [`PricerError::Domain`] when the remaining inputs cannot be priced.
pub fn implied_volatility_with(
    observed_price: f64,
    contract: &OptionContract,
    option_type: OptionType,
    config: &SolverConfig,
) -> PricerResult<f64> {
    if !observed_price.is_finite() || observed_price < config.min_price {
        return Err(PricerError::not_found(format!(
            "observed price {:.4} below minimum {:.4}",
            observed_price, config.min_price
        )));
    }

    let fit = best_fit(observed_price, contract, option_type, config)?;

    if fit.error > config.max_relative_error * observed_price {
        return Err(PricerError::not_found(format!(
            "best fit vol {:.4} misses price {:.4} by {:.4}",
            fit.vol, observed_price, fit.error
        )));
    }

    Ok(fit.vol)
}

/// Run the search without applying the rejection thresholds
pub fn best_fit(
    observed_price: f64,
    contract: &OptionContract,
    option_type: OptionType,
    config: &SolverConfig,
) -> PricerResult<VolFit> {
    contract.validate_market()?;
    if config.min_vol <= 0.0 || config.max_vol < config.min_vol || config.seed_vol <= 0.0 {
        return Err(PricerError::domain(format!(
            "invalid volatility search range [{}, {}] with seed {}",
            config.min_vol, config.max_vol, config.seed_vol
        )));
    }

    let error_at =
        |vol: f64| (price_unchecked(&contract.with_volatility(vol), option_type) - observed_price).abs();

    let mut best = VolFit {
        vol: config.seed_vol,
        error: error_at(config.seed_vol),
    };

    for &vol in config.candidates().iter() {
        let error = error_at(vol);
        if error < best.error {
            best = VolFit { vol, error };
        }
    }

    if config.refine_iterations > 0 {
        let step = config.grid_step();
        let lo = (best.vol - step).max(config.min_vol);
        let hi = (best.vol + step).min(config.max_vol);
        let candidate = golden_section(&error_at, lo, hi, config.refine_iterations);
        let error = error_at(candidate);
        if error < best.error {
            best = VolFit {
                vol: candidate,
                error,
            };
        }
    }

    Ok(best)
}

/// Minimize `f` on [lo, hi], assuming it is unimodal there
fn golden_section(f: &impl Fn(f64) -> f64, mut lo: f64, mut hi: f64, iterations: usize) -> f64 {
    let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;

    let mut x1 = hi - inv_phi * (hi - lo);
    let mut x2 = lo + inv_phi * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    for _ in 0..iterations {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - inv_phi * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + inv_phi * (hi - lo);
            f2 = f(x2);
        }
    }

    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::price;

    fn market(vol: f64) -> OptionContract {
        OptionContract::new(100.0, 100.0, 0.5, 0.05, vol, 0.0)
    }

    #[test]
    fn test_grid_candidates() {
        let config = SolverConfig::default();
        let grid = config.candidates();
        assert_eq!(grid.len(), 100);
        assert!((grid[0] - 0.01).abs() < 1e-12);
        assert!((grid[99] - 2.0).abs() < 1e-12);
        assert!((config.grid_step() - 1.99 / 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_implied_vol_round_trip() {
        let c = market(0.25);
        let observed = price(&c, OptionType::Call).unwrap();
        let iv = implied_volatility(observed, &c.with_volatility(0.0), OptionType::Call).unwrap();
        assert!((iv - 0.25).abs() <= 0.02);
    }

    #[test]
    fn test_iv_otm_put() {
        let c = OptionContract::new(100.0, 90.0, 0.25, 0.05, 0.30, 0.01);
        let observed = price(&c, OptionType::Put).unwrap();
        let iv = implied_volatility(observed, &c, OptionType::Put).unwrap();
        assert!((iv - 0.30).abs() <= 0.02);
    }

    #[test]
    fn test_refined_is_tighter() {
        let c = market(0.4437);
        let observed = price(&c, OptionType::Call).unwrap();
        let iv = implied_volatility_with(observed, &c, OptionType::Call, &SolverConfig::refined())
            .unwrap();
        assert!((iv - 0.4437).abs() < 1e-4);
    }

    #[test]
    fn test_tiny_price_rejected() {
        let err = implied_volatility(0.005, &market(0.2), OptionType::Call).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unreachable_price_rejected() {
        // A call can never be worth more than the spot
        let err = implied_volatility(250.0, &market(0.2), OptionType::Call).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_seed_kept_when_grid_never_improves() {
        // Price exactly at the seed: error 0, nothing on the grid is strictly better
        let c = market(0.5);
        let observed = price(&c, OptionType::Call).unwrap();
        let fit = best_fit(observed, &c, OptionType::Call, &SolverConfig::default()).unwrap();
        assert_eq!(fit.vol, 0.5);
        assert_eq!(fit.error, 0.0);
    }

    #[test]
    fn test_invalid_market_inputs_are_domain_errors() {
        let expired = OptionContract {
            time_to_expiry: 0.0,
            ..market(0.2)
        };
        let err = implied_volatility(5.0, &expired, OptionType::Call).unwrap_err();
        assert!(matches!(err, PricerError::Domain(_)));
    }
}

//! Spot / volatility sweeps
//!
//! Composes the pricer over ranges of inputs. No new numerics here; every
//! cell is an independent Black-Scholes-Merton evaluation.

use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::core::{Greeks, OptionContract, OptionType, PricerError, PricerResult};
use crate::models::black_scholes;

/// Sweep settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Spot range as percent of current spot
    /// Default: (80, 120)
    pub spot_range_pct: (f64, f64),

    /// Volatility range as percent of current vol
    /// Default: (50, 150)
    pub vol_range_pct: (f64, f64),

    /// Points per heatmap axis
    /// Default: 50
    pub heatmap_steps: usize,

    /// Expiry P&L / Greeks profile spans [low * K, high * K]
    /// Default: (0.5, 1.5)
    pub profile_strike_range: (f64, f64),

    /// Points in the profiles
    /// Default: 100
    pub profile_steps: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            spot_range_pct: (80.0, 120.0),
            vol_range_pct: (50.0, 150.0),
            heatmap_steps: 50,
            profile_strike_range: (0.5, 1.5),
            profile_steps: 100,
        }
    }
}

impl ScenarioConfig {
    /// Spot axis for the profiles, centered on the strike
    pub fn profile_spots(&self, strike: f64) -> Array1<f64> {
        Array1::linspace(
            strike * self.profile_strike_range.0,
            strike * self.profile_strike_range.1,
            self.profile_steps,
        )
    }
}

/// Model price and PnL over a (vol x spot) grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlHeatmap {
    pub option_type: OptionType,
    /// Column axis
    pub spots: Array1<f64>,
    /// Row axis
    pub vols: Array1<f64>,
    /// prices[[vol_idx, spot_idx]]
    pub prices: Array2<f64>,
    /// prices - purchase price
    pub pnl: Array2<f64>,
}

impl PnlHeatmap {
    /// (spot, vol, pnl) of the best cell
    pub fn max_pnl(&self) -> Option<(f64, f64, f64)> {
        self.extreme(|a, b| a > b)
    }

    /// (spot, vol, pnl) of the worst cell
    pub fn min_pnl(&self) -> Option<(f64, f64, f64)> {
        self.extreme(|a, b| a < b)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<(f64, f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for ((vi, si), &value) in self.pnl.indexed_iter() {
            if best.map_or(true, |(_, _, b)| better(value, b)) {
                best = Some((self.spots[si], self.vols[vi], value));
            }
        }
        best
    }
}

/// Price and PnL heatmap around the contract's spot and volatility
pub fn pnl_heatmap(
    contract: &OptionContract,
    option_type: OptionType,
    purchase_price: f64,
    config: &ScenarioConfig,
) -> PricerResult<PnlHeatmap> {
    contract.validate()?;
    if config.heatmap_steps == 0 {
        return Err(PricerError::domain("heatmap needs at least one step"));
    }

    let spots = Array1::linspace(
        contract.spot * config.spot_range_pct.0 / 100.0,
        contract.spot * config.spot_range_pct.1 / 100.0,
        config.heatmap_steps,
    );
    let vols = Array1::linspace(
        contract.volatility * config.vol_range_pct.0 / 100.0,
        contract.volatility * config.vol_range_pct.1 / 100.0,
        config.heatmap_steps,
    );

    let mut prices = Array2::zeros((vols.len(), spots.len()));
    for (vi, &vol) in vols.iter().enumerate() {
        for (si, &spot) in spots.iter().enumerate() {
            let scenario = contract.with_spot(spot).with_volatility(vol);
            prices[[vi, si]] = black_scholes::price(&scenario, option_type)?;
        }
    }
    let pnl = prices.mapv(|p| p - purchase_price);

    Ok(PnlHeatmap {
        option_type,
        spots,
        vols,
        prices,
        pnl,
    })
}

/// Greeks at each spot, other inputs held fixed
pub fn greeks_profile(
    contract: &OptionContract,
    option_type: OptionType,
    spots: &[f64],
) -> PricerResult<Vec<(f64, Greeks)>> {
    spots
        .iter()
        .map(|&spot| {
            black_scholes::greeks_for(&contract.with_spot(spot), option_type).map(|g| (spot, g))
        })
        .collect()
}

/// Hold-to-expiry P&L over a spot range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryPnl {
    pub option_type: OptionType,
    pub spots: Vec<f64>,
    /// payoff - purchase price
    pub pnl: Vec<f64>,
    /// Grid spot where |P&L| is smallest
    pub break_even: Option<f64>,
}

/// Payoff at expiry minus premium for each spot
pub fn expiry_pnl(
    strike: f64,
    option_type: OptionType,
    purchase_price: f64,
    spots: &[f64],
) -> ExpiryPnl {
    let pnl: Vec<f64> = spots
        .iter()
        .map(|&s| option_type.intrinsic(s, strike) - purchase_price)
        .collect();

    // First minimum wins on ties
    let break_even = pnl
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, &v)| match best {
            Some((_, b)) if v.abs() >= b => best,
            _ => Some((i, v.abs())),
        })
        .map(|(i, _)| spots[i]);

    ExpiryPnl {
        option_type,
        spots: spots.to_vec(),
        pnl,
        break_even,
    }
}

/// How a purchase price compares with the model price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PricingStatus {
    /// No purchase price entered
    Unpriced,
    Fair,
    /// Relative premium paid over the model, as a fraction
    Overpriced(f64),
    /// Relative discount to the model, as a fraction
    Underpriced(f64),
}

/// Default tolerance for calling a price fair
pub const FAIR_PRICE_THRESHOLD: f64 = 0.01;

impl PricingStatus {
    pub fn assess(purchase_price: f64, model_price: f64, threshold: f64) -> Self {
        if purchase_price == 0.0 {
            return PricingStatus::Unpriced;
        }
        let difference = (purchase_price - model_price) / model_price;
        if difference.abs() <= threshold {
            PricingStatus::Fair
        } else if difference > threshold {
            PricingStatus::Overpriced(difference)
        } else {
            PricingStatus::Underpriced(-difference)
        }
    }
}

impl fmt::Display for PricingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingStatus::Unpriced => Ok(()),
            PricingStatus::Fair => f.write_str("Fairly Priced"),
            PricingStatus::Overpriced(d) => write!(f, "Overpriced ({:.2}%)", d * 100.0),
            PricingStatus::Underpriced(d) => write!(f, "Underpriced ({:.2}%)", d * 100.0),
        }
    }
}

//! Implied volatility surface construction
//!
//! Quotes are solved independently, filtered, then pivoted into a sparse
//! (days-to-expiry x moneyness-or-strike) grid per side, averaging the
//! implied vol of quotes that land in the same cell.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::implied_vol::{implied_volatility_with, SolverConfig};
use crate::core::{
    OptionChainSnapshot, OptionQuote, OptionType, SurfaceAxis, SurfaceGrid, SurfacePair,
    VolSurfacePoint,
};

/// Surface construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Y-axis: moneyness or absolute strike
    /// Default: Moneyness
    pub axis: SurfaceAxis,

    /// Inclusive [low, high] bounds on the y-axis value
    /// Default: None (keep everything)
    pub filter_range: Option<(f64, f64)>,

    /// Per-quote implied vol search
    pub solver: SolverConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            axis: SurfaceAxis::Moneyness,
            filter_range: None,
            solver: SolverConfig::default(),
        }
    }
}

impl SurfaceConfig {
    pub fn new(use_moneyness: bool, filter_range: Option<(f64, f64)>) -> Self {
        Self {
            axis: SurfaceAxis::from_use_moneyness(use_moneyness),
            filter_range,
            ..Default::default()
        }
    }

    /// Strike-axis config from a filter given as percent of spot (e.g. 80-120)
    pub fn strike_filter_from_percent(spot: f64, low_pct: f64, high_pct: f64) -> Self {
        Self {
            axis: SurfaceAxis::Strike,
            filter_range: Some((spot * low_pct / 100.0, spot * high_pct / 100.0)),
            ..Default::default()
        }
    }

    fn y_value(&self, quote: &OptionQuote) -> f64 {
        match self.axis {
            SurfaceAxis::Moneyness => quote.moneyness,
            SurfaceAxis::Strike => quote.strike,
        }
    }

    fn in_range(&self, y: f64) -> bool {
        match self.filter_range {
            Some((low, high)) => y >= low && y <= high,
            None => true,
        }
    }
}

/// A quote paired with its solved implied volatility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedQuote {
    pub quote: OptionQuote,
    pub implied_vol: f64,
}

/// Solve every quote, dropping the ones with no trustworthy implied vol.
///
/// Solves are independent; with the `parallel` feature they run on the rayon
/// pool. Output order follows input order either way.
pub fn solve_quotes(
    quotes: &[OptionQuote],
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    solver: &SolverConfig,
) -> Vec<SolvedQuote> {
    let solve = |quote: &OptionQuote| -> Option<SolvedQuote> {
        let contract = quote.contract(spot, rate, dividend_yield);
        match implied_volatility_with(quote.last_price, &contract, quote.option_type, solver) {
            Ok(implied_vol) => Some(SolvedQuote {
                quote: quote.clone(),
                implied_vol,
            }),
            Err(e) => {
                tracing::trace!(
                    strike = quote.strike,
                    days = quote.days_to_expiry,
                    side = %quote.option_type,
                    "dropping quote: {}",
                    e
                );
                None
            }
        }
    };

    #[cfg(feature = "parallel")]
    let solved: Vec<SolvedQuote> = quotes.par_iter().filter_map(solve).collect();
    #[cfg(not(feature = "parallel"))]
    let solved: Vec<SolvedQuote> = quotes.iter().filter_map(solve).collect();

    tracing::debug!("solved {} of {} quotes", solved.len(), quotes.len());
    solved
}

/// Build call and put surfaces from a quote collection.
///
/// A side with no surviving quotes is `None`; an empty input gives an empty
/// pair rather than an error.
pub fn build_surface(
    quotes: &[OptionQuote],
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    config: &SurfaceConfig,
) -> SurfacePair {
    if quotes.is_empty() {
        return SurfacePair::empty();
    }

    let solved = solve_quotes(quotes, spot, rate, dividend_yield, &config.solver);

    SurfacePair {
        call: pivot_side(&solved, OptionType::Call, config),
        put: pivot_side(&solved, OptionType::Put, config),
    }
}

/// Surface for a fetched chain; a missing chain means no surface
pub fn build_surface_for_chain(
    chain: Option<&OptionChainSnapshot>,
    rate: f64,
    dividend_yield: f64,
    config: &SurfaceConfig,
) -> SurfacePair {
    match chain {
        Some(chain) => build_surface(&chain.quotes, chain.spot, rate, dividend_yield, config),
        None => SurfacePair::empty(),
    }
}

/// Filter one side and average implied vol per (days, y) cell
fn pivot_side(
    solved: &[SolvedQuote],
    option_type: OptionType,
    config: &SurfaceConfig,
) -> Option<SurfaceGrid> {
    let mut cells: Vec<(i64, f64, f64)> = solved
        .iter()
        .filter(|s| s.quote.option_type == option_type)
        .map(|s| (s.quote.days_to_expiry, config.y_value(&s.quote), s.implied_vol))
        .filter(|&(_, y, _)| config.in_range(y))
        .collect();

    if cells.is_empty() {
        tracing::debug!("no {} quotes left for surface", option_type);
        return None;
    }

    cells.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));

    let mut points: Vec<VolSurfacePoint> = Vec::new();
    for (days, y, vol) in cells {
        match points.last_mut() {
            Some(last) if last.days_to_expiry == days && last.y == y => {
                // Running sum; divided below
                last.implied_vol += vol;
                last.count += 1;
            }
            _ => points.push(VolSurfacePoint {
                days_to_expiry: days,
                y,
                implied_vol: vol,
                count: 1,
            }),
        }
    }
    for p in &mut points {
        p.implied_vol /= p.count as f64;
    }

    Some(SurfaceGrid::from_points(option_type, config.axis, points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionContract;
    use crate::models::black_scholes::price;
    use chrono::NaiveDate;

    const SPOT: f64 = 140.0;
    const RATE: f64 = 0.05;
    const DIV: f64 = 0.01;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 18).unwrap()
    }

    /// A volatility lying exactly on the default solver grid
    fn grid_vol(i: usize) -> f64 {
        SolverConfig::default().candidates()[i]
    }

    /// Quote priced off a known flat vol
    fn quote_at_vol(strike: f64, option_type: OptionType, days: i64, vol: f64) -> OptionQuote {
        let mut q = OptionQuote::new(strike, option_type, expiry(), days, 0.0, SPOT);
        let contract = OptionContract::new(SPOT, strike, q.time_to_expiry, RATE, vol, DIV);
        q.last_price = price(&contract, option_type).unwrap();
        q
    }

    #[test]
    fn test_empty_input_gives_no_surfaces() {
        let pair = build_surface(&[], SPOT, RATE, DIV, &SurfaceConfig::default());
        assert!(pair.call.is_none());
        assert!(pair.put.is_none());

        let pair = build_surface_for_chain(None, RATE, DIV, &SurfaceConfig::default());
        assert!(pair.is_empty());
    }

    #[test]
    fn test_surface_axes_and_values() {
        let quotes = vec![
            quote_at_vol(140.0, OptionType::Call, 182, grid_vol(14)),
            quote_at_vol(145.0, OptionType::Call, 182, grid_vol(15)),
            quote_at_vol(140.0, OptionType::Call, 91, grid_vol(13)),
            quote_at_vol(140.0, OptionType::Put, 182, grid_vol(14)),
        ];

        let pair = build_surface(&quotes, SPOT, RATE, DIV, &SurfaceConfig::default());
        let calls = pair.call.unwrap();
        assert_eq!(calls.days, vec![91, 182]);
        assert_eq!(calls.y_values.len(), 2);
        assert_eq!(calls.len(), 3);

        let iv = calls.get(182, 1.0).unwrap();
        assert!((iv - grid_vol(14)).abs() < 1e-9);
        // (91, 145/140) was never quoted
        assert!(calls.get(91, 145.0 / 140.0).is_none());

        let puts = pair.put.unwrap();
        assert_eq!(puts.len(), 1);
    }

    #[test]
    fn test_cell_mean() {
        // Two calls in the same (days, moneyness) cell
        let quotes = vec![
            quote_at_vol(140.0, OptionType::Call, 182, grid_vol(9)),
            quote_at_vol(140.0, OptionType::Call, 182, grid_vol(19)),
        ];
        let solved = solve_quotes(&quotes, SPOT, RATE, DIV, &SolverConfig::default());
        let expected = (solved[0].implied_vol + solved[1].implied_vol) / 2.0;

        let pair = build_surface(&quotes, SPOT, RATE, DIV, &SurfaceConfig::default());
        let calls = pair.call.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls.points[0].count, 2);
        assert!((calls.points[0].implied_vol - expected).abs() < 1e-12);
        assert!(pair.put.is_none());
    }

    #[test]
    fn test_filter_bounds_inclusive() {
        let quotes = vec![
            quote_at_vol(112.0, OptionType::Call, 60, grid_vol(14)), // moneyness 0.8
            quote_at_vol(168.0, OptionType::Call, 60, grid_vol(14)), // moneyness 1.2
            quote_at_vol(210.0, OptionType::Call, 60, grid_vol(14)), // moneyness 1.5
        ];
        let low = quotes[0].moneyness;
        let high = quotes[1].moneyness;

        let config = SurfaceConfig::new(true, Some((low, high)));
        let calls = build_surface(&quotes, SPOT, RATE, DIV, &config).call.unwrap();
        assert_eq!(calls.y_values, vec![low, high]);
    }

    #[test]
    fn test_strike_axis_filter() {
        let quotes = vec![
            quote_at_vol(130.0, OptionType::Put, 30, grid_vol(17)),
            quote_at_vol(150.0, OptionType::Put, 30, grid_vol(16)),
            quote_at_vol(200.0, OptionType::Put, 30, grid_vol(14)),
        ];
        let config = SurfaceConfig::new(false, Some((130.0, 150.0)));
        let puts = build_surface(&quotes, SPOT, RATE, DIV, &config).put.unwrap();
        assert_eq!(puts.axis, SurfaceAxis::Strike);
        assert_eq!(puts.y_values, vec![130.0, 150.0]);
    }

    #[test]
    fn test_filter_that_removes_everything() {
        let quotes = vec![quote_at_vol(140.0, OptionType::Call, 30, grid_vol(14))];
        let config = SurfaceConfig::new(true, Some((1.5, 2.0)));
        assert!(build_surface(&quotes, SPOT, RATE, DIV, &config).is_empty());
    }

    #[test]
    fn test_unsolvable_quotes_dropped() {
        let mut worthless = quote_at_vol(140.0, OptionType::Call, 30, grid_vol(14));
        worthless.last_price = 0.005;
        let mut expired = quote_at_vol(140.0, OptionType::Put, 30, grid_vol(14));
        expired.days_to_expiry = 0;
        expired.time_to_expiry = 0.0;

        let quotes = vec![worthless, expired, quote_at_vol(150.0, OptionType::Call, 30, grid_vol(14))];
        let pair = build_surface(&quotes, SPOT, RATE, DIV, &SurfaceConfig::default());
        assert_eq!(pair.call.unwrap().len(), 1);
        assert!(pair.put.is_none());
    }

    #[test]
    fn test_strike_percent_filter() {
        let config = SurfaceConfig::strike_filter_from_percent(140.0, 80.0, 120.0);
        assert_eq!(config.axis, SurfaceAxis::Strike);
        let (low, high) = config.filter_range.unwrap();
        assert!((low - 112.0).abs() < 1e-9);
        assert!((high - 168.0).abs() < 1e-9);
    }
}

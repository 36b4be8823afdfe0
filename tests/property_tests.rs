//! Property-based tests using proptest.
//!
//! Checks pricing identities and monotonicity over random contracts, and
//! the implied volatility round trip over the solver's working range.

use proptest::prelude::*;
use options_pricer::prelude::*;

// --- Property Test 1: put-call parity ---

proptest! {
    /// C - P = S*e^(-qT) - K*e^(-rT) for every valid contract.
    #[test]
    fn put_call_parity_holds(
        spot in 10.0_f64..500.0,
        moneyness in 0.5_f64..1.5,
        t in 0.01_f64..3.0,
        r in -0.01_f64..0.10,
        vol in 0.05_f64..1.5,
        q in 0.0_f64..0.05,
    ) {
        let c = OptionContract::new(spot, spot * moneyness, t, r, vol, q);
        let (call, put) = bs_prices(&c).unwrap();
        let tolerance = 1e-9 * spot.max(1.0);
        prop_assert!(
            (call - put - c.parity_value()).abs() < tolerance,
            "parity gap {} for {:?}",
            call - put - c.parity_value(),
            c
        );
    }
}

// --- Property Test 2: no-arbitrage bounds ---

proptest! {
    /// Prices are non-negative and bounded by discounted spot / strike.
    #[test]
    fn prices_within_bounds(
        spot in 10.0_f64..500.0,
        moneyness in 0.5_f64..1.5,
        t in 0.01_f64..3.0,
        r in 0.0_f64..0.10,
        vol in 0.05_f64..1.5,
        q in 0.0_f64..0.05,
    ) {
        let c = OptionContract::new(spot, spot * moneyness, t, r, vol, q);
        let (call, put) = bs_prices(&c).unwrap();
        prop_assert!(call >= -1e-12 && call <= spot * c.dividend_factor() + 1e-9);
        prop_assert!(put >= -1e-12 && put <= c.strike * c.discount_factor() + 1e-9);
    }
}

// --- Property Test 3: monotonicity ---

proptest! {
    /// Calls rise and puts fall with spot; both rise with volatility.
    #[test]
    fn prices_monotone_in_spot_and_vol(
        spot in 50.0_f64..150.0,
        t in 0.05_f64..2.0,
        vol in 0.05_f64..1.0,
        bump in 0.01_f64..0.2,
    ) {
        let c = OptionContract::new(spot, 100.0, t, 0.03, vol, 0.01);
        let (call, put) = bs_prices(&c).unwrap();

        let (call_up, put_up) = bs_prices(&c.with_spot(spot * (1.0 + bump))).unwrap();
        prop_assert!(call_up >= call - 1e-12);
        prop_assert!(put_up <= put + 1e-12);

        let (call_hi_vol, put_hi_vol) = bs_prices(&c.with_volatility(vol + bump)).unwrap();
        prop_assert!(call_hi_vol >= call - 1e-12);
        prop_assert!(put_hi_vol >= put - 1e-12);
    }
}

// --- Property Test 4: Greek symmetries ---

proptest! {
    /// Gamma and vega do not depend on the side; deltas differ by e^(-qT).
    #[test]
    fn greeks_side_symmetry(
        spot in 10.0_f64..500.0,
        moneyness in 0.5_f64..1.5,
        t in 0.01_f64..3.0,
        vol in 0.05_f64..1.5,
        q in 0.0_f64..0.05,
    ) {
        let c = OptionContract::new(spot, spot * moneyness, t, 0.04, vol, q);
        let g = bs_greeks(&c).unwrap();

        prop_assert!((g.call.gamma - g.put.gamma).abs() < 1e-12);
        prop_assert!((g.call.vega - g.put.vega).abs() < 1e-12);
        prop_assert!((g.call.delta - g.put.delta - c.dividend_factor()).abs() < 1e-12);
        prop_assert!(g.call.gamma >= 0.0 && g.call.vega >= 0.0);
    }
}

// --- Property Test 5: implied vol round trip ---

proptest! {
    /// Pricing at sigma and solving back lands within one grid cell.
    #[test]
    fn implied_vol_round_trip(vol in 0.05_f64..1.5) {
        let c = OptionContract::new(100.0, 100.0, 0.5, 0.05, vol, 0.0);
        let observed = bs_price(&c, OptionType::Call).unwrap();
        let iv = implied_volatility(observed, &c, OptionType::Call).unwrap();
        prop_assert!((iv - vol).abs() <= 0.02, "sigma {} solved as {}", vol, iv);
    }
}

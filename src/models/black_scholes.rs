//! Black-Scholes-Merton Model
//!
//! Provides:
//! - European option pricing with continuous dividend yield
//! - Analytic Greeks for both sides
//!
//! Every entry point validates its contract first, so degenerate inputs
//! (sigma * sqrt(T) = 0, non-positive spot/strike/time) come back as
//! [`PricerError::Domain`] instead of NaN.

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;

use crate::core::{Greeks, GreeksResult, OptionContract, OptionType, PricerResult};

/// Calendar days used to express theta per day
const THETA_DAYS: f64 = 365.0;
/// Vega and rho are quoted per 1 percentage point
const PERCENT: f64 = 100.0;

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter (contract must already be validated)
pub fn d1(c: &OptionContract) -> f64 {
    let vol_sqrt_t = c.volatility * c.time_to_expiry.sqrt();
    ((c.spot / c.strike).ln()
        + (c.risk_free_rate - c.dividend_yield + 0.5 * c.volatility * c.volatility)
            * c.time_to_expiry)
        / vol_sqrt_t
}

/// Black-Scholes d2 parameter (contract must already be validated)
pub fn d2(c: &OptionContract) -> f64 {
    d1(c) - c.volatility * c.time_to_expiry.sqrt()
}

/// Black-Scholes-Merton European option price
pub fn price(contract: &OptionContract, option_type: OptionType) -> PricerResult<f64> {
    contract.validate()?;
    Ok(price_unchecked(contract, option_type))
}

/// Price without validation, for hot loops that validated once up front
pub(crate) fn price_unchecked(c: &OptionContract, option_type: OptionType) -> f64 {
    let d1 = d1(c);
    let d2 = d1 - c.volatility * c.time_to_expiry.sqrt();
    let spot_pv = c.spot * c.dividend_factor();
    let strike_pv = c.strike * c.discount_factor();

    match option_type {
        OptionType::Call => spot_pv * norm_cdf(d1) - strike_pv * norm_cdf(d2),
        OptionType::Put => strike_pv * norm_cdf(-d2) - spot_pv * norm_cdf(-d1),
    }
}

/// Call and put prices in one pass
pub fn prices(contract: &OptionContract) -> PricerResult<(f64, f64)> {
    contract.validate()?;
    Ok((
        price_unchecked(contract, OptionType::Call),
        price_unchecked(contract, OptionType::Put),
    ))
}

/// Black-Scholes-Merton Greeks for both sides
pub fn greeks(contract: &OptionContract) -> PricerResult<GreeksResult> {
    contract.validate()?;

    let c = contract;
    let d1 = d1(c);
    let d2 = d1 - c.volatility * c.time_to_expiry.sqrt();
    let sqrt_t = c.time_to_expiry.sqrt();
    let pdf_d1 = norm_pdf(d1);
    let df = c.discount_factor();
    let div_factor = c.dividend_factor();

    // Gamma and vega are side-independent
    let gamma = div_factor * pdf_d1 / (c.spot * c.volatility * sqrt_t);
    let vega = c.spot * div_factor * pdf_d1 * sqrt_t / PERCENT;

    let decay = -c.spot * div_factor * pdf_d1 * c.volatility / (2.0 * sqrt_t);

    let call = Greeks {
        delta: div_factor * norm_cdf(d1),
        gamma,
        vega,
        theta: (decay - c.risk_free_rate * c.strike * df * norm_cdf(d2)
            + c.dividend_yield * c.spot * div_factor * norm_cdf(d1))
            / THETA_DAYS,
        rho: c.strike * c.time_to_expiry * df * norm_cdf(d2) / PERCENT,
    };

    let put = Greeks {
        delta: div_factor * (norm_cdf(d1) - 1.0),
        gamma,
        vega,
        theta: (decay + c.risk_free_rate * c.strike * df * norm_cdf(-d2)
            - c.dividend_yield * c.spot * div_factor * norm_cdf(-d1))
            / THETA_DAYS,
        rho: -c.strike * c.time_to_expiry * df * norm_cdf(-d2) / PERCENT,
    };

    Ok(GreeksResult { call, put })
}

/// Greeks for a single side
pub fn greeks_for(contract: &OptionContract, option_type: OptionType) -> PricerResult<Greeks> {
    greeks(contract).map(|g| *g.side(option_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PricerError;

    fn reference() -> OptionContract {
        OptionContract::new(100.0, 100.0, 1.0, 0.05, 0.20, 0.0)
    }

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-10);
        assert!((norm_cdf(1.96) - 0.975).abs() < 0.001);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 0.001);
        assert!((norm_cdf(1.0) + norm_cdf(-1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bs_price() {
        let c = reference();
        let call_price = price(&c, OptionType::Call).unwrap();
        let put_price = price(&c, OptionType::Put).unwrap();

        assert!((call_price - 10.4506).abs() < 1e-4);
        assert!((put_price - 5.5735).abs() < 1e-4);
    }

    #[test]
    fn test_put_call_parity_with_dividends() {
        let c = OptionContract::new(120.0, 110.0, 0.75, 0.03, 0.35, 0.02);
        let (call, put) = prices(&c).unwrap();
        assert!((call - put - c.parity_value()).abs() < 1e-9);
    }

    #[test]
    fn test_greeks() {
        let g = greeks(&reference()).unwrap();

        assert!((g.call.delta - 0.6368).abs() < 1e-4);
        assert!((g.call.gamma - 0.0188).abs() < 1e-4);
        assert!((g.call.vega - 0.3752).abs() < 1e-4);
        assert!((g.call.theta - (-0.0175)).abs() < 1e-4);
        assert!((g.call.rho - 0.5323).abs() < 1e-4);

        // Put delta = call delta - e^(-qT)
        assert!((g.put.delta - (g.call.delta - 1.0)).abs() < 1e-12);
        assert!(g.put.rho < 0.0);
    }

    #[test]
    fn test_gamma_vega_symmetric() {
        let c = OptionContract::new(95.0, 105.0, 0.4, 0.02, 0.3, 0.015);
        let call = greeks_for(&c, OptionType::Call).unwrap();
        let put = greeks_for(&c, OptionType::Put).unwrap();
        assert_eq!(call.gamma, put.gamma);
        assert_eq!(call.vega, put.vega);
    }

    #[test]
    fn test_degenerate_inputs_fail() {
        let zero_vol = reference().with_volatility(0.0);
        assert!(matches!(
            price(&zero_vol, OptionType::Call),
            Err(PricerError::Domain(_))
        ));

        let expired = OptionContract {
            time_to_expiry: 0.0,
            ..reference()
        };
        assert!(matches!(greeks(&expired), Err(PricerError::Domain(_))));

        let bad_spot = reference().with_spot(0.0);
        assert!(price(&bad_spot, OptionType::Put).is_err());
    }

    #[test]
    fn test_deep_itm_call_approaches_forward_intrinsic() {
        let c = OptionContract::new(200.0, 100.0, 0.5, 0.05, 0.1, 0.0);
        let call = price(&c, OptionType::Call).unwrap();
        assert!((call - c.parity_value()).abs() < 1e-6);
    }
}

//! Option contract definitions
//!
//! A European option under Black-Scholes-Merton is fully described by five
//! market/contract parameters plus the volatility being priced at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{PricerError, PricerResult};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricerError::data(format!("unknown option type '{}'", other))),
        }
    }
}

/// Black-Scholes-Merton inputs for a single European option.
///
/// Immutable once built; pricing at another volatility goes through
/// [`OptionContract::with_volatility`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying spot price (S)
    pub spot: f64,
    /// Strike price (K)
    pub strike: f64,
    /// Time to expiry in years (T)
    pub time_to_expiry: f64,
    /// Continuously-compounded risk-free rate (r)
    pub risk_free_rate: f64,
    /// Annualized volatility (sigma)
    pub volatility: f64,
    /// Continuous dividend yield as a decimal fraction (q)
    pub dividend_yield: f64,
}

impl OptionContract {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
        dividend_yield: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
            dividend_yield,
        }
    }

    /// Same contract priced at a different volatility
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self { volatility, ..*self }
    }

    /// Same contract with a different spot
    pub fn with_spot(&self, spot: f64) -> Self {
        Self { spot, ..*self }
    }

    /// Check every input the closed-form formulas need.
    ///
    /// Rejects anything that would make d1/d2 undefined (sigma * sqrt(T) = 0)
    /// or produce NaN downstream.
    pub fn validate(&self) -> PricerResult<()> {
        self.validate_market()?;
        if !self.volatility.is_finite() || self.volatility <= 0.0 {
            return Err(PricerError::domain(format!(
                "volatility must be positive, got {}",
                self.volatility
            )));
        }
        Ok(())
    }

    /// Validation of everything except volatility (used by the IV solver)
    pub fn validate_market(&self) -> PricerResult<()> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(PricerError::domain(format!("spot must be positive, got {}", self.spot)));
        }
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(PricerError::domain(format!(
                "strike must be positive, got {}",
                self.strike
            )));
        }
        if !self.time_to_expiry.is_finite() || self.time_to_expiry <= 0.0 {
            return Err(PricerError::domain(format!(
                "time to expiry must be positive, got {}",
                self.time_to_expiry
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PricerError::domain("risk-free rate must be finite"));
        }
        if !self.dividend_yield.is_finite() || self.dividend_yield < 0.0 {
            return Err(PricerError::domain(format!(
                "dividend yield must be non-negative, got {}",
                self.dividend_yield
            )));
        }
        Ok(())
    }

    /// Moneyness as strike / spot
    pub fn moneyness(&self) -> f64 {
        self.strike / self.spot
    }

    /// Discount factor e^(-rT)
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiry).exp()
    }

    /// Dividend factor e^(-qT)
    pub fn dividend_factor(&self) -> f64 {
        (-self.dividend_yield * self.time_to_expiry).exp()
    }

    /// Right-hand side of put-call parity: S*e^(-qT) - K*e^(-rT)
    pub fn parity_value(&self) -> f64 {
        self.spot * self.dividend_factor() - self.strike * self.discount_factor()
    }

    pub fn intrinsic(&self, option_type: OptionType) -> f64 {
        option_type.intrinsic(self.spot, self.strike)
    }
}

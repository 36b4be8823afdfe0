//! Option Greeks
//!
//! First and second order sensitivities, in dashboard units: vega and rho per
//! 1 percentage point, theta per calendar day.

use serde::{Deserialize, Serialize};

use super::option::OptionType;

/// Option Greeks for one side
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: dV/dS
    pub delta: f64,
    /// Gamma: d²V/dS²
    pub gamma: f64,
    /// Vega: dV/dσ per 1% vol move
    pub vega: f64,
    /// Theta: dV/dt per day
    pub theta: f64,
    /// Rho: dV/dr per 1% rate move
    pub rho: f64,
}

impl Greeks {
    pub fn new(delta: f64, gamma: f64, vega: f64, theta: f64, rho: f64) -> Self {
        Self {
            delta,
            gamma,
            vega,
            theta,
            rho,
        }
    }

    /// (name, value) pairs in display order
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("delta", self.delta),
            ("gamma", self.gamma),
            ("vega", self.vega),
            ("theta", self.theta),
            ("rho", self.rho),
        ]
    }
}

/// Greeks for both sides of a contract.
///
/// Gamma and vega are shared by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    pub call: Greeks,
    pub put: Greeks,
}

impl GreeksResult {
    pub fn side(&self, option_type: OptionType) -> &Greeks {
        match option_type {
            OptionType::Call => &self.call,
            OptionType::Put => &self.put,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_selection() {
        let result = GreeksResult {
            call: Greeks::new(0.6, 0.02, 0.4, -0.01, 0.5),
            put: Greeks::new(-0.4, 0.02, 0.4, -0.005, -0.4),
        };
        assert_eq!(result.side(OptionType::Call).delta, 0.6);
        assert_eq!(result.side(OptionType::Put).rho, -0.4);
    }

    #[test]
    fn test_named_order() {
        let names: Vec<&str> = Greeks::default().named().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["delta", "gamma", "vega", "theta", "rho"]);
    }
}

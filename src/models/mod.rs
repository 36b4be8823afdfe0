//! Pricing Models
//!
//! Implements:
//! - Black-Scholes-Merton (price, Greeks)
//! - Grid-search implied volatility
//! - Implied volatility surface construction

pub mod black_scholes;
pub mod implied_vol;
pub mod iv_surface;

pub use black_scholes::*;
pub use implied_vol::*;
pub use iv_surface::*;

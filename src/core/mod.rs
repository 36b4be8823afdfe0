//! Core data types for the options pricer
//!
//! Defines fundamental types:
//! - OptionContract: Black-Scholes-Merton inputs, call/put
//! - Greeks: sensitivities per side
//! - OptionQuote: normalized market records
//! - SurfaceGrid: sparse implied volatility surface

pub mod option;
pub mod quote;
pub mod surface;
pub mod greeks;
pub mod error;

pub use option::*;
pub use quote::*;
pub use surface::*;
pub use greeks::*;
pub use error::*;

//! Scenario analysis on top of the pricer
//!
//! PnL heatmaps, Greeks and expiry P&L profiles, pricing status.

pub mod scenario;

pub use scenario::*;

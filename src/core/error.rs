//! Error types for the options pricer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricerError {
    /// Invalid mathematical input (non-positive spot, zero vol, ...)
    #[error("Domain error: {0}")]
    Domain(String),

    /// No trustworthy implied volatility for an observed price
    #[error("Implied volatility not found: {0}")]
    NotFound(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PricerResult<T> = Result<T, PricerError>;

impl PricerError {
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the solver's expected "no implied vol" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for failures coming from the market-data collaborator
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Data(_) | Self::Network(_))
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

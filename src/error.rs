//! MoE router error types.
//!
//! Routing itself has a single failure mode: an expert count too small to
//! hold the shared expert plus at least one routed expert. The remaining
//! variants belong to configuration loading.

use thiserror::Error;

/// MoE router errors.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Router or playback parameters are unusable.
    ///
    /// Raised when `expert_count < 2` (no room beside the shared expert) or
    /// when playback is configured with zero frames per token.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

impl From<toml::de::Error> for RouterError {
    fn from(err: toml::de::Error) -> Self {
        RouterError::Config(err.to_string())
    }
}

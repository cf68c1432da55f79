//! Error types for cluster bootstrap configuration.

use thiserror::Error;

/// Result type for cluster bootstrap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Cluster bootstrap errors.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A setting was present but its value could not be used.
    #[error("invalid value [{value}] for setting [{key}]: {reason}")]
    InvalidSetting {
        /// The setting key.
        key: String,

        /// The raw value.
        value: String,

        /// Why the value was rejected.
        reason: String,
    },
}

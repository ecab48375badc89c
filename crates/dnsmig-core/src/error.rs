//! Error types for the migration system
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the migration system
#[derive(Error, Debug)]
pub enum Error {
    /// Registrar-related errors (unexpected response shape, rejected call)
    #[error("Registrar error: {0}")]
    Registrar(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system errors (run directory, audit log, backup)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV audit log errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP client errors (transport, timeout, non-success status)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a registrar error
    pub fn registrar(msg: impl Into<String>) -> Self {
        Self::Registrar(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

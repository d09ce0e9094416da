//! Error types for dynutil
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dynutil operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dynutil
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or contradictory command-line options
    #[error("{0}")]
    Usage(String),

    /// Credentials file could not be read, parsed or is incomplete
    #[error("{0}")]
    Credentials(String),

    /// The provider rejected the session credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone, node or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input passed to a session call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A query or mutation failed; `context` names the operation and target
    #[error("{context}: {message}")]
    Query {
        /// What was being attempted
        context: String,
        /// Underlying failure
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// The four failure families a user can run into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected before any file or network access
    Usage,
    /// Credentials file problems
    Credentials,
    /// Session could not be opened
    Authentication,
    /// Anything that went wrong talking to the provider
    Query,
}

impl Error {
    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a credentials file error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
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

    /// Wrap an error with the operation it interrupted
    pub fn query(context: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Query {
            context: context.into(),
            message: cause.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Usage(_) => ErrorKind::Usage,
            Error::Credentials(_) => ErrorKind::Credentials,
            Error::Authentication(_) => ErrorKind::Authentication,
            _ => ErrorKind::Query,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

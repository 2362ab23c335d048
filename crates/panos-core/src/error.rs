//! Error types for the PAN-OS modules
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for PAN-OS module operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the PAN-OS modules
#[derive(Error, Debug)]
pub enum Error {
    /// Required module parameters were absent, null or empty
    #[error("missing required arguments: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// The caller passed parameters the module does not know
    #[error(
        "Unsupported parameters for ({module}) module: {}. Supported parameters include: {}",
        .names.join(", "),
        .supported.join(", ")
    )]
    UnsupportedParameters {
        /// Module name
        module: String,
        /// Offending parameter names
        names: Vec<String>,
        /// Parameters the module accepts
        supported: Vec<String>,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The XML API client is not available in this build
    #[error("{0}")]
    MissingClient(String),

    /// Error reported by the device in an XML API response envelope
    #[error("{message}")]
    Api {
        /// Response `code` attribute, when present
        code: Option<u32>,
        /// Text collected from the response `msg` element
        message: String,
    },

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Malformed XML in a response
    #[error("XML error: {0}")]
    Xml(String),

    /// Commit job failed or could not be tracked
    #[error("Commit failed: {0}")]
    Commit(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing-parameters error
    pub fn missing(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::MissingParameters(names.into_iter().map(Into::into).collect())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a missing-client error
    pub fn missing_client(msg: impl Into<String>) -> Self {
        Self::MissingClient(msg.into())
    }

    /// Create an API error from a response envelope
    pub fn api(code: Option<u32>, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an XML error
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Create a commit error
    pub fn commit(msg: impl Into<String>) -> Self {
        Self::Commit(msg.into())
    }

    /// Whether the error was raised before any remote call could be made
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameters(_)
                | Self::UnsupportedParameters { .. }
                | Self::InvalidInput(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

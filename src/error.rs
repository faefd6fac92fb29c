// src/error.rs

//! Error types for the cellarman client

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving backend operations
#[derive(Error, Debug)]
pub enum Error {
    /// Client could not be constructed (bad config, TLS setup, ...)
    #[error("initialization failed: {0}")]
    InitError(String),

    /// The event stream could not be established at the connection level
    #[error("transport error: {0}")]
    TransportError(String),

    /// The backend reported that the operation needs elevated privileges
    #[error("privilege denied: {0}")]
    PrivilegeDenied(String),

    /// The operation ran and failed, with the backend-supplied message
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// The user dismissed the credential prompt
    #[error("operation cancelled")]
    Cancelled,

    /// A request was rejected before being sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A read-side API call failed
    #[error("API error: {0}")]
    ApiError(String),

    /// A backend response could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Configuration file or value problem
    #[error("config error: {0}")]
    ConfigError(String),

    /// IO error during terminal interaction or file access
    #[error("IO error: {0}")]
    IoError(String),
}

impl Error {
    /// Message carried by the error, without the variant prefix
    pub fn detail(&self) -> String {
        match self {
            Error::InitError(m)
            | Error::TransportError(m)
            | Error::PrivilegeDenied(m)
            | Error::OperationFailed(m)
            | Error::InvalidRequest(m)
            | Error::ApiError(m)
            | Error::ParseError(m)
            | Error::ConfigError(m)
            | Error::IoError(m) => m.clone(),
            Error::Cancelled => "operation cancelled".to_string(),
        }
    }
}

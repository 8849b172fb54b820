//! Error types for the MedLens client.
//!
//! Fallible operations across the workspace return `MedlensResult<T>`.
//! Normalization and highlighting are infallible and never produce these.

use thiserror::Error;

/// The unified error type for the MedLens client.
#[derive(Debug, Error)]
pub enum MedlensError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// A response body could not be parsed as JSON.
    #[error("failed to parse response: {reason}")]
    ResponseParse { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The session storage backend could not be read or written.
    #[error("session storage error: {reason}")]
    Storage { reason: String },

    /// User input was rejected before any request was made.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No valid session exists.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The session belongs to a user whose role may not open the page.
    #[error("role '{role}' may not access this page")]
    Forbidden { role: String },
}

impl MedlensError {
    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the MedLens crates.
pub type MedlensResult<T> = Result<T, MedlensError>;

//! Error types for trk
//!
//! Exit codes for the CLI:
//! - 0: Success
//! - 2: User error (bad args, invalid config, rejected input)
//! - 4: Operation failed (store failure, IO, network)
//!
//! The same taxonomy maps onto the REST surface: validation failures are
//! 400, missing records are 404, a missing identity in required mode is
//! 401, and everything else is a 500 with an opaque message.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the trk CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for trk operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2, HTTP 4xx)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} record not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Missing user identity header: {0}")]
    IdentityRequired(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    // Operation failures (exit code 4, HTTP 500)
    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Construct a NotFound error for a resource kind
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::NotFound { .. }
            | Error::IdentityRequired(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::UserNotFound(_) => exit_codes::USER_ERROR,

            Error::Store(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Http(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Get the HTTP status code this error surfaces as at the API boundary
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::IdentityRequired(_) => 401,
            Error::NotFound { .. } | Error::UserNotFound(_) => 404,
            Error::InvalidArgument(_) | Error::InvalidConfig(_) => 400,
            _ => 500,
        }
    }
}

/// Result type alias for trk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for the JSON error body returned by the REST API
///
/// Every error response has the shape `{"error": "..."}`; internal detail
/// (paths, stack context) stays out of the message.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct JsonError {
    pub error: String,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
        }
    }
}

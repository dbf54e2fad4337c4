//! Unified error type for imrelay.
//!
//! All crates map their internal errors into [`AppError`] so that the `?`
//! operator composes across crate boundaries. The variant a caller sees
//! tells it what to do: surface verbatim, log and continue, or treat as
//! absent data. See §7 of the spec for the full taxonomy this mirrors.

use std::fmt;

use thiserror::Error;

/// Category of error, used to decide propagation policy at each boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Bad input from a client: malformed cursor, unknown session type, etc.
    /// Policy: surface to the caller verbatim.
    ClientError,
    /// Webhook rejection, blocked/not-friend, and similar authorization
    /// failures. Policy: surface to the caller.
    Permission,
    /// Broker, cache RPC, or gateway RPC failure. Policy: log and continue,
    /// isolated per target.
    Transient,
    /// Version log missing, user not found, and similar absent-data cases.
    /// Policy: treat as empty/skip, never panic.
    DataAbsent,
    /// Configuration could not be loaded or parsed.
    Configuration,
    /// JSON (de)serialization failure.
    Serialization,
    /// Anything else.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientError => write!(f, "CLIENT_ERROR"),
            Self::Permission => write!(f, "PERMISSION"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::DataAbsent => write!(f, "DATA_ABSENT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout imrelay.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a client error.
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClientError, message)
    }

    /// Create a permission error.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
    }

    /// Create a transient infrastructure error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    /// Create a data-absent error.
    pub fn absent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataAbsent, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns true if this error's policy is "log and continue" rather
    /// than surfacing to a caller.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Transient)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("configuration error: {err}"),
            err,
        )
    }
}

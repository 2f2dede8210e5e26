//! Error types used throughout callwire
//!
//! Every terminal failure a caller can observe is a [`CallwireError`]. The
//! variants follow the request lifecycle: input validation happens before
//! any I/O, credential acquisition before dispatch, and classification of
//! the HTTP outcome after it.

use std::fmt;

use thiserror::Error;

/// Main error type for callwire
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallwireError {
    /// Caller input rejected before any request was built.
    #[error("Invalid parameter `{parameter}`: {message}")]
    Validation { parameter: String, message: String },

    /// Credential acquisition failed, or the API rejected a fresh credential.
    #[error("Authentication error: {message}")]
    Auth { message: String, status: Option<u16> },

    /// Network failure, 5xx or 429 that outlived the retry budget.
    #[error("Transient {kind} failure after {attempts} attempt(s): {message}")]
    Transient { kind: TransientKind, status: Option<u16>, message: String, attempts: u32 },

    /// A 4xx the server will keep returning (400, 403, 404, 409, ...).
    #[error("Request rejected with status {status}: {body}")]
    Permanent { status: u16, body: String },

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Operation cancelled")]
    Cancelled,

    /// A 2xx payload that could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Which transient condition exhausted the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Network,
    RateLimited,
    Server,
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network"),
            Self::RateLimited => f.write_str("rate-limit"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// Guards tripped by a paginator facing a misbehaving server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Server returned cursor `{cursor}` twice in a row")]
    RepeatedCursor { cursor: String },

    #[error("Page limit of {max_pages} exceeded")]
    PageLimitExceeded { max_pages: u32 },
}

/// Flat error category for programmatic branching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Transient,
    Permanent,
    Pagination,
    Cancelled,
    Decode,
    Config,
}

impl CallwireError {
    /// Build a validation error for `parameter`.
    pub fn validation(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { parameter: parameter.into(), message: message.into() }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth { message: message.into(), status: None }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::Permanent { .. } => ErrorKind::Permanent,
            Self::Pagination(_) => ErrorKind::Pagination,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status attached to the failure, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Transient { status, .. } => *status,
            Self::Permanent { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Name of the offending parameter for validation failures.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Validation { parameter, .. } => Some(parameter),
            _ => None,
        }
    }

    /// Whether a caller-level retry of the whole operation could succeed.
    ///
    /// The executor has already spent its own retry budget by the time a
    /// transient error surfaces; this only reports the category.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Result type alias for callwire operations
pub type Result<T> = std::result::Result<T, CallwireError>;

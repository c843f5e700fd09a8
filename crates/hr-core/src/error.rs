//! Core error type and the caller-facing error classification.
//!
//! Sub-crates define their own error enums and map each variant onto an
//! [`ErrorKind`] via a `kind()` method.  The kind, not the Rust type, is what
//! crosses the service boundary.

use std::fmt;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `hr-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Classification of every failure a routing call can surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An input point is malformed.
    InvalidGeometry,
    /// The routable graph has no vertices.
    NoNetwork,
    /// Snapped vertices are not connected, or the merged route is disjoint.
    NoRoute,
    /// The network/graph store could not be reached or queried.
    StoreUnavailable,
    /// A hub or college id does not exist.
    NotFound,
    /// A request is missing a required field.
    Validation,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidGeometry  => "INVALID_GEOMETRY",
            ErrorKind::NoNetwork        => "NO_NETWORK",
            ErrorKind::NoRoute          => "NO_ROUTE",
            ErrorKind::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorKind::NotFound         => "NOT_FOUND",
            ErrorKind::Validation       => "VALIDATION",
        }
    }

    /// HTTP status class a web layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InvalidGeometry | ErrorKind::Validation => 400,
            ErrorKind::NoNetwork | ErrorKind::NoRoute | ErrorKind::NotFound => 404,
            ErrorKind::StoreUnavailable => 500,
        }
    }

    /// `true` for faults on the server side rather than in the request or data.
    pub fn is_server_fault(self) -> bool {
        self.http_status() >= 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

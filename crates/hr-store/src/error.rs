//! Error types for hr-store.

use thiserror::Error;

use hr_core::ErrorKind;
use hr_spatial::SpatialError;

/// Errors that can occur when reading from or writing to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot encode route geometry: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Every store failure is a server-side fault from the caller's view.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StoreUnavailable
    }
}

impl From<StoreError> for SpatialError {
    fn from(e: StoreError) -> Self {
        SpatialError::StoreUnavailable(e.to_string())
    }
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

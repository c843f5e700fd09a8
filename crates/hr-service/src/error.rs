//! Service-level error type.

use thiserror::Error;

use hr_core::{CoreError, ErrorKind, PointId};
use hr_spatial::SpatialError;
use hr_store::{PointKind, StoreError};

/// Everything a service call can fail with.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("{} {id} not found", kind.label())]
    NotFound { kind: PointKind, id: PointId },

    #[error("no bus hub found")]
    NoHub,

    #[error("{0}")]
    Validation(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Spatial(e)     => e.kind(),
            ServiceError::Store(e)       => e.kind(),
            ServiceError::Config(_)      => ErrorKind::Validation,
            ServiceError::NotFound { .. }
            | ServiceError::NoHub        => ErrorKind::NotFound,
            ServiceError::Validation(_)  => ErrorKind::Validation,
        }
    }

    pub(crate) fn not_found(kind: PointKind, id: PointId) -> Self {
        ServiceError::NotFound { kind, id }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

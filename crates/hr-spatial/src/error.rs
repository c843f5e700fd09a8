//! Spatial-subsystem error type.

use thiserror::Error;

use hr_core::{ErrorKind, GeoPoint, VertexId};

/// Errors produced by `hr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("invalid point {0}: coordinates must be finite WGS-84 lon/lat")]
    InvalidGeometry(GeoPoint),

    #[error("the routable road network is empty")]
    NoNetwork,

    #[error("no route from {from} to {to}")]
    NoRoute { from: VertexId, to: VertexId },

    #[error("route geometry is disjoint: {unmerged} of {total} segments could not be joined")]
    DisjointRoute { unmerged: usize, total: usize },

    #[error("segment {0} is not part of the searched graph")]
    SegmentMissing(hr_core::SegmentId),

    #[error("network store unavailable: {0}")]
    StoreUnavailable(String),
}

impl SpatialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpatialError::InvalidGeometry(_)  => ErrorKind::InvalidGeometry,
            SpatialError::NoNetwork           => ErrorKind::NoNetwork,
            SpatialError::NoRoute { .. }
            | SpatialError::DisjointRoute { .. }
            | SpatialError::SegmentMissing(_) => ErrorKind::NoRoute,
            SpatialError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;

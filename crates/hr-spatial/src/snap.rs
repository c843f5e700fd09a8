//! Snapping arbitrary points to the nearest network vertex.

use log::debug;

use hr_core::{GeoPoint, VertexId};

use crate::store::NetworkStore;
use crate::{SpatialError, SpatialResult};

/// Maps a geographic point to its nearest network vertex.
///
/// Stateless apart from the borrowed store; cheap to construct per request.
pub struct VertexSnapper<'a, S: NetworkStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: NetworkStore + ?Sized> VertexSnapper<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Return the id of the vertex nearest to `point`.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidGeometry`] if `point` is not a finite
    ///   WGS-84 coordinate.
    /// - [`SpatialError::NoNetwork`] if the network has no vertices.
    /// - [`SpatialError::StoreUnavailable`] from the store.
    pub fn snap(&self, point: GeoPoint) -> SpatialResult<VertexId> {
        if !point.is_valid() {
            return Err(SpatialError::InvalidGeometry(point));
        }
        let vertex = self
            .store
            .nearest_vertex(point)?
            .ok_or(SpatialError::NoNetwork)?;
        debug!("snapped {point} to {vertex}");
        Ok(vertex)
    }
}

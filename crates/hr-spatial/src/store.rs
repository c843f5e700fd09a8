//! The seam between the routing core and the network/graph store.
//!
//! The core never owns network data.  Everything it needs is read through
//! [`NetworkStore`], one query per call, so each request sees the store's
//! current state.  Implementations:
//!
//! - [`RoadNetwork`](crate::RoadNetwork): in-memory, R-tree backed.
//! - `hr_store::SqliteStore`: reads the `ways` /
//!   `ways_vertices_pgr` tables on every call.

use hr_core::{GeoPoint, VertexId};

use crate::network::SegmentRow;
use crate::SpatialResult;

/// Read-only access to a road network.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the two endpoint snaps of one
/// request run concurrently against the same store.
pub trait NetworkStore: Send + Sync {
    /// Id of the vertex nearest to `pos`, or `None` if there are no vertices.
    ///
    /// Ties are broken by the implementation's native order.
    fn nearest_vertex(&self, pos: GeoPoint) -> SpatialResult<Option<VertexId>>;

    /// Every segment row, including rows with null geometry or endpoints.
    /// Filtering happens in `SegmentGraph`, which also supplies the
    /// segments for assembly.
    fn segment_rows(&self) -> SpatialResult<Vec<SegmentRow>>;
}

impl<S: NetworkStore + ?Sized> NetworkStore for &S {
    fn nearest_vertex(&self, pos: GeoPoint) -> SpatialResult<Option<VertexId>> {
        (**self).nearest_vertex(pos)
    }

    fn segment_rows(&self) -> SpatialResult<Vec<SegmentRow>> {
        (**self).segment_rows()
    }
}

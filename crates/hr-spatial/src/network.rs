//! Network records and the in-memory road network.
//!
//! # Records
//!
//! - [`NetworkVertex`]: a routable node (`ways_vertices_pgr` row).
//! - [`SegmentRow`]: a `ways` row exactly as stored; any column may be null.
//! - [`NetworkSegment`]: a row that passed the routability filter, with its
//!   length resolved.
//!
//! # In-memory store
//!
//! [`RoadNetwork`] holds vertices and segment rows in memory and answers
//! nearest-vertex queries from an R-tree (via `rstar`) over `[lon, lat]`.
//! It implements [`NetworkStore`] and is what tests and embedded callers use
//! in place of a database.

use geo::LineString;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use hr_core::{GeoPoint, SegmentId, VertexId, geodesic_length_m};

use crate::store::NetworkStore;
use crate::SpatialResult;

// ── Records ───────────────────────────────────────────────────────────────────

/// A routable road-network vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NetworkVertex {
    pub id:       VertexId,
    pub position: GeoPoint,
}

/// A routable road-network segment.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkSegment {
    pub id:       SegmentId,
    pub source:   VertexId,
    pub target:   VertexId,
    /// WGS-84 geometry, in the store's coordinate order.
    pub geometry: LineString<f64>,
    /// Geodesic length in metres.  Always finite and non-negative.
    pub length_m: f64,
}

impl NetworkSegment {
    /// Build a segment whose length is derived from `geometry`.
    pub fn from_geometry(
        id:       SegmentId,
        source:   VertexId,
        target:   VertexId,
        geometry: LineString<f64>,
    ) -> Self {
        let length_m = geodesic_length_m(&geometry);
        Self { id, source, target, geometry, length_m }
    }
}

/// A segment row as read from the store, before the routability filter.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRow {
    pub id:       SegmentId,
    pub source:   Option<VertexId>,
    pub target:   Option<VertexId>,
    pub geometry: Option<LineString<f64>>,
    /// Stored length, if the store carries one.  Derived from the geometry
    /// otherwise.
    pub length_m: Option<f64>,
}

impl SegmentRow {
    /// Apply the routability filter.
    ///
    /// Returns `None` if the geometry or either endpoint is null, or if the
    /// resolved length is negative or not finite (Dijkstra needs
    /// non-negative weights).
    pub fn into_segment(self) -> Option<NetworkSegment> {
        let (source, target, geometry) = (self.source?, self.target?, self.geometry?);
        let length_m = self.length_m.unwrap_or_else(|| geodesic_length_m(&geometry));
        if !length_m.is_finite() || length_m < 0.0 {
            return None;
        }
        Some(NetworkSegment { id: self.id, source, target, geometry, length_m })
    }
}

impl From<NetworkSegment> for SegmentRow {
    fn from(s: NetworkSegment) -> Self {
        Self {
            id:       s.id,
            source:   Some(s.source),
            target:   Some(s.target),
            geometry: Some(s.geometry),
            length_m: Some(s.length_m),
        }
    }
}

// ── R-tree vertex entry ───────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a `[lon, lat]` point with the
/// associated `VertexId`.
#[derive(Clone)]
struct VertexEntry {
    point: [f64; 2],
    id:    VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    /// Squared Euclidean distance in lon/lat space, the same ordering a
    /// PostGIS `<->` query over EPSG:4326 produces.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlon = self.point[0] - point[0];
        let dlat = self.point[1] - point[1];
        dlon * dlon + dlat * dlat
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// In-memory road network plus a spatial index for vertex snapping.
///
/// Do not construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    vertices:    Vec<NetworkVertex>,
    rows:        Vec<SegmentRow>,
    spatial_idx: RTree<VertexEntry>,
}

impl RoadNetwork {
    /// A network with no vertices and no segments.  Every snap against it
    /// fails with `NoNetwork`.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of segment rows, routable or not.
    pub fn segment_count(&self) -> usize {
        self.rows.len()
    }
}

impl NetworkStore for RoadNetwork {
    fn nearest_vertex(&self, pos: GeoPoint) -> SpatialResult<Option<VertexId>> {
        Ok(self
            .spatial_idx
            .nearest_neighbor(&[pos.lon, pos.lat])
            .map(|e| e.id))
    }

    fn segment_rows(&self) -> SpatialResult<Vec<SegmentRow>> {
        Ok(self.rows.clone())
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use hr_core::{GeoPoint, SegmentId, VertexId};
/// use hr_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_vertex(VertexId(1), GeoPoint::new(31.20, 30.04));
/// let c = b.add_vertex(VertexId(2), GeoPoint::new(31.21, 30.04));
/// b.add_road(SegmentId(10), a, c);
/// let net = b.build();
/// assert_eq!(net.vertex_count(), 2);
/// assert_eq!(net.segment_count(), 1);
/// ```
pub struct RoadNetworkBuilder {
    vertices: Vec<NetworkVertex>,
    position: FxHashMap<VertexId, GeoPoint>,
    rows:     Vec<SegmentRow>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            position: FxHashMap::default(),
            rows:     Vec::new(),
        }
    }

    /// Add a vertex and return its id.
    pub fn add_vertex(&mut self, id: VertexId, position: GeoPoint) -> VertexId {
        self.vertices.push(NetworkVertex { id, position });
        self.position.insert(id, position);
        id
    }

    /// Position of a vertex added earlier.
    pub fn vertex_pos(&self, id: VertexId) -> Option<GeoPoint> {
        self.position.get(&id).copied()
    }

    /// Add a segment with explicit geometry; length is derived from it.
    pub fn add_segment(
        &mut self,
        id:       SegmentId,
        source:   VertexId,
        target:   VertexId,
        geometry: LineString<f64>,
    ) {
        self.rows.push(NetworkSegment::from_geometry(id, source, target, geometry).into());
    }

    /// Add a straight segment between two known vertices with a given
    /// length.  If either vertex is unknown the row gets a null geometry and
    /// is never routable.
    pub fn add_road_with_length(
        &mut self,
        id:       SegmentId,
        source:   VertexId,
        target:   VertexId,
        length_m: f64,
    ) {
        let geometry = match (self.vertex_pos(source), self.vertex_pos(target)) {
            (Some(a), Some(b)) => Some(LineString::new(vec![a.into(), b.into()])),
            _ => None,
        };
        self.rows.push(SegmentRow {
            id,
            source: Some(source),
            target: Some(target),
            geometry,
            length_m: Some(length_m),
        });
    }

    /// Add a straight segment between two known vertices; length is the
    /// geodesic distance between them.
    pub fn add_road(&mut self, id: SegmentId, source: VertexId, target: VertexId) {
        let length_m = match (self.vertex_pos(source), self.vertex_pos(target)) {
            (Some(a), Some(b)) => a.distance_m(b),
            _ => 0.0,
        };
        self.add_road_with_length(id, source, target, length_m);
    }

    /// Add a raw row as-is, nulls included.
    pub fn add_row(&mut self, row: SegmentRow) {
        self.rows.push(row);
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Rows are kept as added; duplicate segment ids stay separate rows.
    pub fn build(self) -> RoadNetwork {
        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<VertexEntry> = self
            .vertices
            .iter()
            .map(|v| VertexEntry {
                point: [v.position.lon, v.position.lat],
                id:    v.id,
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            vertices: self.vertices,
            rows: self.rows,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

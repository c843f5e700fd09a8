//! Searchable graph built from segment rows for a single request.
//!
//! # Data layout
//!
//! Store vertex ids are sparse `i64`s, so they are first mapped to dense
//! `u32` indices.  Outgoing arcs then use **Compressed Sparse Row (CSR)**
//! format: the arcs leaving dense vertex `v` occupy
//!
//! ```text
//! arc_*[ out_start[v] .. out_start[v+1] ]
//! ```
//!
//! The graph is undirected: every routable segment contributes one arc in
//! each direction, both pointing at the segment's *edge index*, its position
//! in [`SegmentGraph::segment`].  The graph owns the segments it was built
//! from, so assembly reads exactly the rows the search ran over even when the
//! store's key column is not unique.
//!
//! The graph is rebuilt from the store on every request so it always
//! reflects the store's current state.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use hr_core::VertexId;

use crate::network::{NetworkSegment, SegmentRow};

/// Undirected weighted graph over routable segments, in CSR form.
pub struct SegmentGraph {
    /// Dense index → store id.
    vertex_ids:   Vec<VertexId>,
    /// Store id → dense index.
    vertex_index: FxHashMap<VertexId, u32>,

    /// CSR row pointer.  Length = `vertex_count + 1`.
    out_start:    Vec<u32>,

    // ── Arc data (indexed by arc position in sorted order) ───────────────
    /// Source of each arc.  Needed to walk predecessor arcs back to the start.
    arc_from:     Vec<u32>,
    arc_to:       Vec<u32>,
    /// Edge index of each arc's segment.
    arc_edge:     Vec<u32>,
    /// Segment length in metres.  Used as Dijkstra cost.
    arc_weight:   Vec<f64>,

    /// Routable segments, indexed by edge.
    segments:     Vec<NetworkSegment>,
}

impl SegmentGraph {
    /// Build from raw store rows, dropping rows that are not routable.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = SegmentRow>,
    {
        let mut dropped = 0usize;
        let segments: Vec<NetworkSegment> = rows
            .into_iter()
            .filter_map(|row| {
                let seg = row.into_segment();
                if seg.is_none() {
                    dropped += 1;
                }
                seg
            })
            .collect();
        if dropped > 0 {
            warn!("excluded {dropped} segment rows with null geometry, null endpoints or bad length");
        }
        Self::from_segments(segments)
    }

    /// Build from segments that already passed the routability filter.
    ///
    /// Duplicate segment ids are kept as separate edges.
    fn from_segments(segments: Vec<NetworkSegment>) -> Self {
        let mut vertex_ids: Vec<VertexId> = Vec::new();
        let mut vertex_index: FxHashMap<VertexId, u32> = FxHashMap::default();
        let mut intern = |id: VertexId| -> u32 {
            *vertex_index.entry(id).or_insert_with(|| {
                vertex_ids.push(id);
                (vertex_ids.len() - 1) as u32
            })
        };

        struct RawArc {
            from:    u32,
            to:      u32,
            edge:    u32,
            weight:  f64,
        }

        let mut raw: Vec<RawArc> = Vec::with_capacity(segments.len() * 2);
        for (edge, s) in segments.iter().enumerate() {
            let (a, b, edge) = (intern(s.source), intern(s.target), edge as u32);
            raw.push(RawArc { from: a, to: b, edge, weight: s.length_m });
            raw.push(RawArc { from: b, to: a, edge, weight: s.length_m });
        }

        // Sort arcs by source vertex for CSR construction.
        raw.sort_unstable_by_key(|a| a.from);

        let vertex_count = vertex_ids.len();
        let mut out_start = vec![0u32; vertex_count + 1];
        for a in &raw {
            out_start[a.from as usize + 1] += 1;
        }
        for i in 1..=vertex_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[vertex_count] as usize, raw.len());

        let graph = SegmentGraph {
            arc_from:    raw.iter().map(|a| a.from).collect(),
            arc_to:      raw.iter().map(|a| a.to).collect(),
            arc_edge:    raw.iter().map(|a| a.edge).collect(),
            arc_weight:  raw.iter().map(|a| a.weight).collect(),
            vertex_ids,
            vertex_index,
            out_start,
            segments,
        };
        debug!(
            "built segment graph: {} vertices, {} segments, {} arcs",
            graph.vertex_count(),
            graph.segment_count(),
            graph.arc_count()
        );
        graph
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of directed arcs (twice the segment count).
    pub fn arc_count(&self) -> usize {
        self.arc_to.len()
    }

    /// `true` if no segment is routable.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment at `edge`, as returned in [`ShortestPath::edges`].
    ///
    /// [`ShortestPath::edges`]: crate::ShortestPath::edges
    pub fn segment(&self, edge: usize) -> Option<&NetworkSegment> {
        self.segments.get(edge)
    }

    // ── Index plumbing for the router ─────────────────────────────────────

    #[inline]
    pub(crate) fn dense(&self, id: VertexId) -> Option<u32> {
        self.vertex_index.get(&id).copied()
    }

    /// Arc positions leaving dense vertex `v`.  A contiguous range.
    #[inline]
    pub(crate) fn out_arcs(&self, v: u32) -> std::ops::Range<usize> {
        let start = self.out_start[v as usize] as usize;
        let end   = self.out_start[v as usize + 1] as usize;
        start..end
    }

    #[inline]
    pub(crate) fn arc_from(&self, arc: usize) -> u32 {
        self.arc_from[arc]
    }

    #[inline]
    pub(crate) fn arc_to(&self, arc: usize) -> u32 {
        self.arc_to[arc]
    }

    #[inline]
    pub(crate) fn arc_edge(&self, arc: usize) -> usize {
        self.arc_edge[arc] as usize
    }

    #[inline]
    pub(crate) fn arc_weight(&self, arc: usize) -> f64 {
        self.arc_weight[arc]
    }
}

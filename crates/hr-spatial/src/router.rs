//! Shortest-path trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `hr-service` calls routing via the [`GraphRouter`] trait, so callers can
//! swap in A*, a contraction hierarchy, or a cached graph without touching
//! the orchestration.
//!
//! # Cost units
//!
//! Costs are segment lengths in metres (`f64`), summed without rounding.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;

use hr_core::{SegmentId, VertexId};

use crate::graph::SegmentGraph;

// ── ShortestPath ──────────────────────────────────────────────────────────────

/// The result of a successful search: traversed segments in order, from
/// start to goal, and their summed length.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Vertex the path leaves from.  Fixes the direction of the assembled
    /// geometry.
    pub start:    VertexId,
    pub segments: Vec<SegmentId>,
    /// `edges[i]` is the position of `segments[i]` in the searched
    /// [`SegmentGraph`].  Ids alone are ambiguous when the store's key
    /// column is not unique.
    pub edges:    Vec<usize>,
    pub weight_m: f64,
}

impl ShortestPath {
    /// The path from `vertex` to itself.
    pub fn trivial(vertex: VertexId) -> Self {
        Self { start: vertex, segments: Vec::new(), edges: Vec::new(), weight_m: 0.0 }
    }

    /// `true` if start and goal are the same vertex.
    pub fn is_trivial(&self) -> bool {
        self.segments.is_empty()
    }
}

// ── GraphRouter trait ─────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single router can serve
/// concurrent requests.
pub trait GraphRouter: Send + Sync {
    /// Search from `start` to `goal`.
    ///
    /// Returns `Some(ShortestPath::trivial(start))` when `start == goal`, and
    /// `None` when `goal` is unreachable (including when either vertex has
    /// no routable segment).
    fn shortest_path(
        &self,
        graph: &SegmentGraph,
        start: VertexId,
        goal:  VertexId,
    ) -> Option<ShortestPath>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm with a binary heap over the CSR segment graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl GraphRouter for DijkstraRouter {
    fn shortest_path(
        &self,
        graph: &SegmentGraph,
        start: VertexId,
        goal:  VertexId,
    ) -> Option<ShortestPath> {
        if start == goal {
            return Some(ShortestPath::trivial(start));
        }
        let (from, to) = (graph.dense(start)?, graph.dense(goal)?);
        let path = dijkstra(graph, from, to).map(|(edges, weight_m)| ShortestPath {
            start,
            segments: edges.iter().filter_map(|&e| graph.segment(e)).map(|s| s.id).collect(),
            edges,
            weight_m,
        });
        match &path {
            Some(p) => debug!(
                "shortest path {start} -> {goal}: {} segments, {:.1} m",
                p.segments.len(),
                p.weight_m
            ),
            None => debug!("no path {start} -> {goal}"),
        }
        path
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Sentinel for "no predecessor arc".
const NO_ARC: usize = usize::MAX;

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost:   f64,
    vertex: u32,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap); the
        // vertex index keeps ordering total and deterministic on ties.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Edges from `from` to `to` in order, with their summed weight.
fn dijkstra(graph: &SegmentGraph, from: u32, to: u32) -> Option<(Vec<usize>, f64)> {
    let n = graph.vertex_count();
    // dist[v] = best known cost (m) to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev_arc[v] = arc that reached v; NO_ARC for unreached vertices.
    let mut prev_arc = vec![NO_ARC; n];

    dist[from as usize] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, vertex: from });

    while let Some(State { cost, vertex }) = heap.pop() {
        if vertex == to {
            return Some((reconstruct(graph, &prev_arc, from, to), cost));
        }

        // Skip stale heap entries.
        if cost > dist[vertex as usize] {
            continue;
        }

        for arc in graph.out_arcs(vertex) {
            let next = graph.arc_to(arc);
            let next_cost = cost + graph.arc_weight(arc);

            if next_cost < dist[next as usize] {
                dist[next as usize] = next_cost;
                prev_arc[next as usize] = arc;
                heap.push(State { cost: next_cost, vertex: next });
            }
        }
    }

    None
}

fn reconstruct(graph: &SegmentGraph, prev_arc: &[usize], from: u32, to: u32) -> Vec<usize> {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let arc = prev_arc[cur as usize];
        if arc == NO_ARC {
            break;
        }
        edges.push(graph.arc_edge(arc));
        cur = graph.arc_from(arc);
    }
    edges.reverse();
    edges
}

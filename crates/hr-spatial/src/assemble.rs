//! Turning a shortest path into a route: one line, a distance, a time.
//!
//! # Geometry merge
//!
//! [`merge_lines`] joins segment geometries end to end regardless of their
//! stored orientation or order, reversing pieces as needed.  A set that
//! cannot be joined into a single line is disjoint and reported as
//! [`SpatialError::DisjointRoute`], never passed through as a partial line.
//!
//! # Travel time
//!
//! `travel_time_s = distance_m / 1000 / speed_kmh * 3600` and
//! `travel_time_min = travel_time_s / 60`, evaluated in exactly that order.
//! The output geometry stays in the network's coordinate system.

use std::collections::VecDeque;

use geo::{Coord, LineString};
use log::debug;

use hr_core::{VertexId, is_valid_speed};

use crate::graph::SegmentGraph;
use crate::network::NetworkSegment;
use crate::router::ShortestPath;
use crate::{SpatialError, SpatialResult};

/// Endpoints closer than this (degrees, per axis) are the same point.
const COORD_EPS: f64 = 1e-9;

// ── RouteResult ───────────────────────────────────────────────────────────────

/// A computed route.  Built fresh per request; never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub geometry:        LineString<f64>,
    pub distance_m:      f64,
    pub travel_time_s:   f64,
    pub travel_time_min: f64,
    pub speed_kmh:       f64,
}

impl RouteResult {
    /// The zero-length route between a vertex and itself.
    pub fn degenerate(speed_kmh: f64) -> Self {
        Self {
            geometry:        LineString::new(Vec::new()),
            distance_m:      0.0,
            travel_time_s:   0.0,
            travel_time_min: 0.0,
            speed_kmh,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.geometry.0.is_empty()
    }
}

/// Seconds needed to cover `distance_m` at `speed_kmh`.
#[inline]
pub fn travel_time_s(distance_m: f64, speed_kmh: f64) -> f64 {
    distance_m / 1000.0 / speed_kmh * 3600.0
}

// ── RouteAssembler ────────────────────────────────────────────────────────────

/// Merges path geometry and derives distance and travel time.
#[derive(Debug, Clone, Copy)]
pub struct RouteAssembler {
    default_speed_kmh: f64,
}

impl RouteAssembler {
    /// `default_speed_kmh` replaces any caller speed that is absent, zero,
    /// negative or not finite.  It is expected to be valid itself
    /// (`RouteConfig::validate` checks it).
    pub fn new(default_speed_kmh: f64) -> Self {
        Self { default_speed_kmh }
    }

    pub fn default_speed_kmh(&self) -> f64 {
        self.default_speed_kmh
    }

    /// The speed actually used for a request.
    pub fn resolve_speed(&self, requested: Option<f64>) -> f64 {
        match requested {
            Some(s) if is_valid_speed(s) => s,
            Some(s) => {
                debug!("speed {s} km/h is not usable, falling back to {}", self.default_speed_kmh);
                self.default_speed_kmh
            }
            None => self.default_speed_kmh,
        }
    }

    /// Take the path's segments from the `graph` it was found in and
    /// assemble them.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::SegmentMissing`] if a path edge is not in `graph`
    ///   or carries a different segment id.
    /// - [`SpatialError::DisjointRoute`] if the geometries do not join.
    pub fn assemble(
        &self,
        graph:     &SegmentGraph,
        path:      &ShortestPath,
        speed_kmh: Option<f64>,
    ) -> SpatialResult<RouteResult> {
        if path.is_trivial() {
            return Ok(RouteResult::degenerate(self.resolve_speed(speed_kmh)));
        }

        let mut ordered = Vec::with_capacity(path.segments.len());
        for (i, &id) in path.segments.iter().enumerate() {
            let seg = path
                .edges
                .get(i)
                .and_then(|&edge| graph.segment(edge))
                .filter(|s| s.id == id)
                .ok_or(SpatialError::SegmentMissing(id))?;
            ordered.push(seg);
        }
        self.assemble_segments(&ordered, Some(path.start), speed_kmh)
    }

    /// Assemble segments already in path order.
    ///
    /// With `start` set, the output line begins at that vertex's end of the
    /// first segment.  An empty slice yields the degenerate route.
    pub fn assemble_segments(
        &self,
        segments:  &[&NetworkSegment],
        start:     Option<VertexId>,
        speed_kmh: Option<f64>,
    ) -> SpatialResult<RouteResult> {
        let speed_kmh = self.resolve_speed(speed_kmh);
        if segments.is_empty() {
            return Ok(RouteResult::degenerate(speed_kmh));
        }

        let lines: Vec<&LineString<f64>> = segments.iter().map(|s| &s.geometry).collect();
        let mut geometry = merge_lines(&lines)?;
        if let Some(origin) = start.and_then(|v| departure_coord(segments[0], v)) {
            orient_from(&mut geometry, origin);
        }

        let distance_m: f64 = segments.iter().map(|s| s.length_m).sum();
        let travel_time_s = travel_time_s(distance_m, speed_kmh);

        debug!(
            "assembled {} segments: {:.1} m, {:.1} s at {speed_kmh} km/h",
            segments.len(),
            distance_m,
            travel_time_s
        );

        Ok(RouteResult {
            geometry,
            distance_m,
            travel_time_s,
            travel_time_min: travel_time_s / 60.0,
            speed_kmh,
        })
    }
}

// ── Line merge ────────────────────────────────────────────────────────────────

/// Coordinate at which `segment` touches vertex `v`, if `v` is an endpoint.
fn departure_coord(segment: &NetworkSegment, v: VertexId) -> Option<Coord<f64>> {
    if segment.source == v {
        segment.geometry.0.first().copied()
    } else if segment.target == v {
        segment.geometry.0.last().copied()
    } else {
        None
    }
}

/// Reverse `line` if it ends, rather than starts, at `origin`.
fn orient_from(line: &mut LineString<f64>, origin: Coord<f64>) {
    let starts = line.0.first().is_some_and(|c| same_point(*c, origin));
    let ends = line.0.last().is_some_and(|c| same_point(*c, origin));
    if ends && !starts {
        line.0.reverse();
    }
}

#[inline]
fn same_point(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() <= COORD_EPS && (a.y - b.y).abs() <= COORD_EPS
}

/// Join `lines` into one continuous line.
///
/// Empty lines are ignored.  The first non-empty line fixes the output
/// orientation; every other line is attached at whichever end of the chain
/// it touches, reversed if needed.
///
/// # Errors
///
/// [`SpatialError::DisjointRoute`] if some lines never touch the chain.
pub fn merge_lines(lines: &[&LineString<f64>]) -> SpatialResult<LineString<f64>> {
    let mut pending: Vec<&LineString<f64>> =
        lines.iter().copied().filter(|l| !l.0.is_empty()).collect();
    let total = pending.len();
    if pending.is_empty() {
        return Ok(LineString::new(Vec::new()));
    }

    let first = pending.remove(0);
    let mut chain: VecDeque<Coord<f64>> = first.0.iter().copied().collect();

    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|line| !attach(&mut chain, line));
        if pending.len() == before {
            return Err(SpatialError::DisjointRoute { unmerged: pending.len(), total });
        }
    }

    Ok(LineString::new(chain.into_iter().collect()))
}

/// Try to attach `line` to either end of `chain`.  Returns `true` on success.
fn attach(chain: &mut VecDeque<Coord<f64>>, line: &LineString<f64>) -> bool {
    let pts = &line.0;
    let (Some(&start), Some(&end)) = (pts.first(), pts.last()) else {
        return true;
    };
    let (Some(&head), Some(&tail)) = (chain.front(), chain.back()) else {
        return false;
    };

    if same_point(tail, start) {
        chain.extend(pts.iter().skip(1).copied());
    } else if same_point(tail, end) {
        chain.extend(pts.iter().rev().skip(1).copied());
    } else if same_point(head, end) {
        for c in pts.iter().rev().skip(1) {
            chain.push_front(*c);
        }
    } else if same_point(head, start) {
        for c in pts.iter().skip(1) {
            chain.push_front(*c);
        }
    } else {
        return false;
    }
    true
}

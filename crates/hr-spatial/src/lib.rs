//! `hr-spatial` — the route computation core.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`store`]    | `NetworkStore` trait: the seam to the network/graph store      |
//! | [`network`]  | `NetworkVertex`, `NetworkSegment`, `SegmentRow`, `RoadNetwork` (in-memory store + R-tree) |
//! | [`snap`]     | `VertexSnapper`                                                |
//! | [`graph`]    | `SegmentGraph` (CSR, built per request from segment rows)      |
//! | [`router`]   | `GraphRouter` trait, `ShortestPath`, `DijkstraRouter`          |
//! | [`assemble`] | `RouteAssembler`, `RouteResult`, `merge_lines`                 |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                             |
//!
//! A route is computed as: snap both endpoints → build `SegmentGraph` →
//! `GraphRouter::shortest_path` → `RouteAssembler::assemble`.  The
//! orchestration lives in `hr-service`.

pub mod assemble;
pub mod error;
pub mod graph;
pub mod network;
pub mod router;
pub mod snap;
pub mod store;


pub use assemble::{RouteAssembler, RouteResult, merge_lines, travel_time_s};
pub use error::{SpatialError, SpatialResult};
pub use graph::SegmentGraph;
pub use network::{NetworkSegment, NetworkVertex, RoadNetwork, RoadNetworkBuilder, SegmentRow};
pub use router::{DijkstraRouter, GraphRouter, ShortestPath};
pub use snap::VertexSnapper;
pub use store::NetworkStore;

//! `hr-core` — foundational types for the `hubroute` workspace.
//!
//! This crate is a dependency of every other `hr-*` crate.  It has no `hr-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`ids`]     | `VertexId`, `SegmentId`, `PointId`                          |
//! | [`geodesy`] | `GeoPoint`, haversine distance, geodesic line length        |
//! | [`config`]  | `SchemaConfig`, `SegmentIdColumn`, `RouteConfig`            |
//! | [`error`]   | `CoreError`, `CoreResult`, `ErrorKind`                      |

pub mod config;
pub mod error;
pub mod geodesy;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{RouteConfig, SchemaConfig, SegmentIdColumn, is_valid_speed};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use geodesy::{GeoPoint, geodesic_length_m};
pub use ids::{PointId, SegmentId, VertexId};

//! `hr-service` — the only component callers talk to.
//!
//! [`RouteService`] composes the routing core:
//!
//! ```text
//!  hub ──snap──┐
//!              ├─ rayon::join ─→ SegmentGraph ─→ GraphRouter ─→ RouteAssembler ─→ RouteResult
//!  college ─snap┘
//! ```
//!
//! and adds the id-based operations (route by ids, nearest hub, saving a
//! choice) on top of `hr_store`.  [`api`] holds the wire shapes.

pub mod api;
pub mod error;
pub mod service;

#[cfg(test)]
mod tests;

pub use api::{Endpoint, Envelope, ErrorBody, RouteRequest, RouteResponse, SavedChoice};
pub use error::{ServiceError, ServiceResult};
pub use service::RouteService;

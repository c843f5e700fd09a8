//! Routable points: bus hubs and colleges.

use serde::Serialize;

use hr_core::{GeoPoint, PointId};

use crate::StoreResult;

/// Which table a point lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointKind {
    Hub,
    College,
}

impl PointKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            PointKind::Hub     => "bus_hubs",
            PointKind::College => "data",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PointKind::Hub     => "hub",
            PointKind::College => "college",
        }
    }
}

/// A hub or college with a usable position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoutablePoint {
    pub id:       PointId,
    pub name:     String,
    pub position: GeoPoint,
}

/// The hub closest to some position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NearestHub {
    pub hub_id:   PointId,
    pub hub_name: String,
    /// Great-circle distance in metres.
    pub dist_m:   f64,
}

/// Lookup of routable points.
pub trait PointStore: Send + Sync {
    /// The point `id` of `kind`, or `None` if it does not exist or has no
    /// position.
    fn point(&self, kind: PointKind, id: PointId) -> StoreResult<Option<RoutablePoint>>;

    /// The hub nearest to `pos`, ordered by planar lon/lat distance.
    /// `None` if no hub has a position.
    fn nearest_hub(&self, pos: GeoPoint) -> StoreResult<Option<NearestHub>>;
}

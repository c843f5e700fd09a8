//! Geographic coordinate type and length helpers.
//!
//! Coordinates are WGS-84 (EPSG:4326) longitude/latitude in `f64`.  The
//! field order follows GeoJSON and `geo::Coord` (`x = lon`, `y = lat`).
//!
//! Segment lengths are geodesic: the haversine distance summed over
//! consecutive vertices.  Raw degree-space or Web-Mercator lengths are not
//! metric and must never be used as routing weights.

use geo::line_measures::LengthMeasurable;
use geo::{Coord, Distance, Haversine, LineString, Point};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `true` if both ordinates are finite and inside the WGS-84 domain.
    pub fn is_valid(self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Haversine great-circle distance in metres, on the mean-radius sphere.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        Haversine.distance(Point::from(self), Point::from(other))
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        GeoPoint::new(c.x, c.y)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint::new(p.x(), p.y())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Geodesic length of a line in metres.
///
/// Zero for empty and single-vertex lines.
pub fn geodesic_length_m(line: &LineString<f64>) -> f64 {
    line.length(&Haversine)
}

//! Decoding `ways.the_geom`.
//!
//! Road imports store segment geometry as text in one of two forms:
//!
//! - GeoJSON: `{"type":"LineString","coordinates":[[31.2,30.0],[31.3,30.0]]}`
//! - WKT, optionally with an EWKT SRID prefix:
//!   `SRID=4326;LINESTRING(31.2 30.0, 31.3 30.0)`
//!
//! A `MultiLineString` with exactly one part is accepted as that part.
//! Anything else is unreadable and the row is treated as having no geometry.

use geo::{LineString, MultiLineString};
use wkt::TryFromWkt;

/// Parse a stored segment geometry.  Returns `None` if the text is not a
/// single line in either supported encoding.
pub fn parse_line(text: &str) -> Option<LineString<f64>> {
    let text = text.trim();
    if text.starts_with('{') {
        from_geojson(text)
    } else {
        from_wkt(strip_srid(text))
    }
}

fn from_geojson(text: &str) -> Option<LineString<f64>> {
    let geometry: geojson::Geometry = serde_json::from_str(text).ok()?;
    match geometry.value {
        value @ geojson::Value::LineString(_) => LineString::try_from(value).ok(),
        value @ geojson::Value::MultiLineString(_) => {
            single_part(MultiLineString::try_from(value).ok()?)
        }
        _ => None,
    }
}

fn from_wkt(text: &str) -> Option<LineString<f64>> {
    let head = text.get(..15).unwrap_or(text).to_ascii_uppercase();
    if head.starts_with("MULTILINESTRING") {
        single_part(MultiLineString::try_from_wkt_str(text).ok()?)
    } else {
        LineString::try_from_wkt_str(text).ok()
    }
}

fn strip_srid(text: &str) -> &str {
    match text.split_once(';') {
        Some((prefix, rest)) if prefix.trim_start().to_ascii_uppercase().starts_with("SRID=") => {
            rest.trim_start()
        }
        _ => text,
    }
}

fn single_part(multi: MultiLineString<f64>) -> Option<LineString<f64>> {
    let mut parts = multi.0;
    if parts.len() == 1 { parts.pop() } else { None }
}

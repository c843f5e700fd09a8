//! Persisting a student's college choice together with its route.
//!
//! The route geometry column is either a JSON column or plain text,
//! depending on the upstream schema.  [`StoredGeometry`] is the form the
//! geometry takes on its way into that column.

use std::fmt;

use geo::LineString;
use serde::Serialize;

use hr_core::PointId;

use crate::StoreResult;

// ── ChoiceSource ──────────────────────────────────────────────────────────────

/// How the hub of a choice was picked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceSource {
    #[default]
    Manual,
    /// Nearest hub, resolved by the service.
    Auto,
}

impl ChoiceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceSource::Manual => "manual",
            ChoiceSource::Auto   => "auto",
        }
    }

    /// Lenient parse: trims and lowercases, `fallback` for anything else.
    pub fn normalize(text: &str, fallback: ChoiceSource) -> ChoiceSource {
        match text.trim().to_ascii_lowercase().as_str() {
            "manual" => ChoiceSource::Manual,
            "auto"   => ChoiceSource::Auto,
            _        => fallback,
        }
    }
}

impl fmt::Display for ChoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── StoredGeometry ────────────────────────────────────────────────────────────

/// A route geometry ready for the `route_geojson` column.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredGeometry {
    /// Written through SQLite's `json()` so the column holds valid JSON.
    Structured(serde_json::Value),
    /// Written verbatim.
    Text(String),
}

impl StoredGeometry {
    /// Encode `line` as a GeoJSON geometry, structured or as text.
    pub fn encode(line: &LineString<f64>, structured: bool) -> StoreResult<Self> {
        let geometry = geojson::Geometry::new(geojson::Value::from(line));
        let value = serde_json::to_value(&geometry)?;
        Ok(if structured {
            StoredGeometry::Structured(value)
        } else {
            StoredGeometry::Text(value.to_string())
        })
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, StoredGeometry::Structured(_))
    }

    /// The text bound to the SQL parameter.
    pub fn to_sql_text(&self) -> String {
        match self {
            StoredGeometry::Structured(v) => v.to_string(),
            StoredGeometry::Text(s)       => s.clone(),
        }
    }
}

// ── ChoiceStore ───────────────────────────────────────────────────────────────

/// A choice to be saved.
#[derive(Clone, Debug, PartialEq)]
pub struct NewChoice {
    pub student_id:       i64,
    pub college_id:       PointId,
    pub hub_id:           PointId,
    pub route_distance_m: f64,
    pub route_time_s:     f64,
    pub route_geometry:   LineString<f64>,
    pub choice_source:    ChoiceSource,
    pub notes:            String,
}

/// Persistence of student choices.
pub trait ChoiceStore: Send + Sync {
    /// Insert `choice` with status `saved` and return its row id.
    ///
    /// The implementation encodes the geometry according to its schema.
    fn save_choice(&self, choice: &NewChoice) -> StoreResult<i64>;
}

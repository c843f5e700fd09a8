//! Caller-facing request and response shapes.
//!
//! Field names are camelCase on the wire:
//!
//! ```json
//! { "hubId": 3, "collegePosition": { "lon": 31.21, "lat": 30.02 }, "speedKmh": 30 }
//! ```
//!
//! Every answer is wrapped in an [`Envelope`]: `{ "ok": true, "data": … }` or
//! `{ "ok": false, "error": { "code": "NO_ROUTE", "message": "…" } }`.

use serde::{Deserialize, Serialize};

use hr_core::{GeoPoint, PointId};
use hr_spatial::RouteResult;
use hr_store::ChoiceSource;

use crate::error::{ServiceError, ServiceResult};

// ── Request ───────────────────────────────────────────────────────────────────

/// A route request.  Each endpoint is given either as a position or as an id.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_position:     Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_id:           Option<PointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_position: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_id:       Option<PointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh:        Option<f64>,
}

/// One end of a route.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Endpoint {
    Position(GeoPoint),
    Id(PointId),
}

impl Endpoint {
    /// Exactly one of `position` / `id` must be set.
    pub(crate) fn pick(name: &str, position: Option<GeoPoint>, id: Option<PointId>) -> ServiceResult<Self> {
        match (position, id) {
            (Some(p), None) => Ok(Endpoint::Position(p)),
            (None, Some(id)) => Ok(Endpoint::Id(id)),
            (None, None) => Err(ServiceError::Validation(format!(
                "{name}Position or {name}Id is required"
            ))),
            (Some(_), Some(_)) => Err(ServiceError::Validation(format!(
                "give either {name}Position or {name}Id, not both"
            ))),
        }
    }
}

impl RouteRequest {
    pub fn hub(&self) -> ServiceResult<Endpoint> {
        Endpoint::pick("hub", self.hub_position, self.hub_id)
    }

    pub fn college(&self) -> ServiceResult<Endpoint> {
        Endpoint::pick("college", self.college_position, self.college_id)
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// A computed route as returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// GeoJSON `LineString`, empty for a zero-length route.
    pub geometry:            geojson::Geometry,
    pub distance_meters:     f64,
    pub travel_time_seconds: f64,
    pub travel_time_minutes: f64,
    pub speed_kmh:           f64,
}

impl From<&RouteResult> for RouteResponse {
    fn from(r: &RouteResult) -> Self {
        Self {
            geometry:            geojson::Geometry::new(geojson::Value::from(&r.geometry)),
            distance_meters:     r.distance_m,
            travel_time_seconds: r.travel_time_s,
            travel_time_minutes: r.travel_time_min,
            speed_kmh:           r.speed_kmh,
        }
    }
}

/// A saved student choice.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChoice {
    pub choice_id:        i64,
    pub student_id:       i64,
    pub college_id:       PointId,
    pub hub_id:           PointId,
    pub choice_source:    ChoiceSource,
    pub route_distance_m: f64,
    pub route_time_s:     f64,
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// `{ code, message }` describing a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code:    String,
    pub message: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(e: &ServiceError) -> Self {
        Self { code: e.kind().code().to_owned(), message: e.to_string() }
    }
}

/// Uniform wrapper around every answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub ok:    bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data:  Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    pub fn failure(error: &ServiceError) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

impl<T> From<ServiceResult<T>> for Envelope<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(data) => Envelope::success(data),
            Err(e) => Envelope::failure(&e),
        }
    }
}

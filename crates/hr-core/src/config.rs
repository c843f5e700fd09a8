//! Process-wide configuration values.
//!
//! Both types here are resolved once at startup and then passed by shared
//! reference into every component.  Nothing mutates them afterwards.
//!
//! - [`SchemaConfig`] is produced by `hr_store::SchemaProbe` from the live
//!   store.
//! - [`RouteConfig`] comes from defaults, an optional TOML file, and CLI /
//!   environment overrides (in that order).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── SchemaConfig ──────────────────────────────────────────────────────────────

/// Column that carries the surrogate key of a network segment.
///
/// Upstream road imports disagree on the name.  Keeping the candidates as an
/// enum means the chosen name can be interpolated into SQL without any
/// injection surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentIdColumn {
    #[default]
    Gid,
    Id,
    OsmId,
    TheId,
}

impl SegmentIdColumn {
    /// Candidates in detection priority order.
    pub const PRIORITY: [SegmentIdColumn; 4] = [
        SegmentIdColumn::Gid,
        SegmentIdColumn::Id,
        SegmentIdColumn::OsmId,
        SegmentIdColumn::TheId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentIdColumn::Gid   => "gid",
            SegmentIdColumn::Id    => "id",
            SegmentIdColumn::OsmId => "osm_id",
            SegmentIdColumn::TheId => "the_id",
        }
    }

    /// Exact (case-sensitive) match against a column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|c| c.as_str() == name)
    }

    /// Highest-priority candidate present in `columns`, or `Gid` if none is.
    pub fn pick<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        columns
            .into_iter()
            .filter_map(Self::from_name)
            .min_by_key(|c| c.rank())
            .unwrap_or(SegmentIdColumn::Gid)
    }

    fn rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|c| *c == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

impl fmt::Display for SegmentIdColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream schema facts detected once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub segment_id_column:            SegmentIdColumn,
    /// `true` if stored route geometries are a JSON column, `false` if text.
    pub route_geometry_is_structured: bool,
}

impl SchemaConfig {
    /// Apply the "contains json" heuristic to a declared column type.
    ///
    /// An empty type (column or table missing) is text.
    pub fn is_structured_type(declared_type: &str) -> bool {
        declared_type.to_ascii_lowercase().contains("json")
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            segment_id_column:            SegmentIdColumn::Gid,
            route_geometry_is_structured: true,
        }
    }
}

// ── RouteConfig ───────────────────────────────────────────────────────────────

/// Default assumed travel speed when the caller supplies none (km/h).
pub const DEFAULT_SPEED_KMH: f64 = 40.0;

/// `true` if `speed_kmh` can be used for a travel-time estimate.
#[inline]
pub fn is_valid_speed(speed_kmh: f64) -> bool {
    speed_kmh.is_finite() && speed_kmh > 0.0
}

/// Service-level settings.
///
/// # TOML format
///
/// ```toml
/// default_speed_kmh = 40.0
/// database          = "network.db"
/// busy_timeout_ms   = 5000
/// ```
///
/// Every key is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteConfig {
    /// Speed substituted for absent or invalid request speeds.
    pub default_speed_kmh: f64,
    /// SQLite file holding the network, hubs, colleges and choices.
    pub database:          PathBuf,
    /// How long a store call waits on a locked database before failing.
    pub busy_timeout_ms:   u64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            default_speed_kmh: DEFAULT_SPEED_KMH,
            database:          PathBuf::from("hubroute.db"),
            busy_timeout_ms:   5_000,
        }
    }
}

impl RouteConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: RouteConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject settings that would make every travel-time estimate invalid.
    pub fn validate(&self) -> CoreResult<()> {
        if !is_valid_speed(self.default_speed_kmh) {
            return Err(CoreError::Config(format!(
                "default_speed_kmh must be a finite positive number, got {}",
                self.default_speed_kmh
            )));
        }
        if self.database.as_os_str().is_empty() {
            return Err(CoreError::Config("database path is empty".into()));
        }
        Ok(())
    }
}

//! SQLite-backed store.
//!
//! [`SqliteStore`] keeps only the file path, the probed schema and the busy
//! timeout.  Every call opens its own short-lived connection, read-only for
//! queries and read-write for [`ChoiceStore::save_choice`], so the store is
//! `Send + Sync` and no lock is held between calls.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};

use hr_core::{GeoPoint, PointId, RouteConfig, SchemaConfig, SegmentId, VertexId};
use hr_spatial::{NetworkStore, SegmentRow, SpatialResult};

use crate::choices::{ChoiceStore, NewChoice, StoredGeometry};
use crate::geometry::parse_line;
use crate::points::{NearestHub, PointKind, PointStore, RoutablePoint};
use crate::schema::{SchemaProbe, create_schema};
use crate::StoreResult;

/// Network, point and choice store over one SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path:         PathBuf,
    schema:       SchemaConfig,
    busy_timeout: Duration,
}

impl SqliteStore {
    /// Open an existing database and probe its schema.
    ///
    /// Fails if the file cannot be opened.  Callers treat that as fatal.
    pub fn open(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        let mut store = Self {
            path: path.to_path_buf(),
            schema: SchemaConfig::default(),
            busy_timeout,
        };
        let conn = store.read_conn()?;
        store.schema = SchemaProbe::detect(&conn)?;
        Ok(store)
    }

    /// [`open`](Self::open) with the path and timeout from `config`.
    pub fn from_config(config: &RouteConfig) -> StoreResult<Self> {
        Self::open(&config.database, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Use a known schema instead of probing.
    pub fn with_schema(path: &Path, schema: SchemaConfig, busy_timeout: Duration) -> Self {
        Self { path: path.to_path_buf(), schema, busy_timeout }
    }

    /// Create the database file (if needed) and every table, then open it.
    pub fn init(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        drop(conn);
        Self::open(path, busy_timeout)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    // ── Connections ───────────────────────────────────────────────────────

    fn read_conn(&self) -> StoreResult<Connection> {
        self.connect(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
    }

    fn write_conn(&self) -> StoreResult<Connection> {
        self.connect(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX)
    }

    fn connect(&self, flags: OpenFlags) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    fn query_nearest_vertex(&self, pos: GeoPoint) -> StoreResult<Option<VertexId>> {
        let conn = self.read_conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM ways_vertices_pgr \
                 WHERE lon IS NOT NULL AND lat IS NOT NULL \
                 ORDER BY (lon - ?1) * (lon - ?1) + (lat - ?2) * (lat - ?2) \
                 LIMIT 1",
                params![pos.lon, pos.lat],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(VertexId))
    }

    fn query_segment_rows(&self) -> StoreResult<Vec<SegmentRow>> {
        let conn = self.read_conn()?;
        let key = self.schema.segment_id_column.as_str();
        let mut stmt = conn.prepare(&format!(
            "SELECT {key}, source, target, the_geom FROM ways WHERE {key} IS NOT NULL"
        ))?;
        let rows = stmt.query_map([], segment_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

/// Map `(id, source, target, the_geom)` to a [`SegmentRow`].
fn segment_row(row: &Row<'_>) -> rusqlite::Result<SegmentRow> {
    let id: i64 = row.get(0)?;
    let geom: Option<String> = row.get(3)?;
    let geometry = geom.as_deref().and_then(|text| {
        let line = parse_line(text);
        if line.is_none() {
            warn!("ways row {id}: unreadable geometry, treating as null");
        }
        line
    });
    Ok(SegmentRow {
        id:       SegmentId(id),
        source:   row.get::<_, Option<i64>>(1)?.map(VertexId),
        target:   row.get::<_, Option<i64>>(2)?.map(VertexId),
        geometry,
        length_m: None,
    })
}

// ── NetworkStore ──────────────────────────────────────────────────────────────

impl NetworkStore for SqliteStore {
    fn nearest_vertex(&self, pos: GeoPoint) -> SpatialResult<Option<VertexId>> {
        Ok(self.query_nearest_vertex(pos)?)
    }

    fn segment_rows(&self) -> SpatialResult<Vec<SegmentRow>> {
        let rows = self.query_segment_rows()?;
        debug!("read {} ways rows", rows.len());
        Ok(rows)
    }
}

// ── PointStore ────────────────────────────────────────────────────────────────

impl PointStore for SqliteStore {
    fn point(&self, kind: PointKind, id: PointId) -> StoreResult<Option<RoutablePoint>> {
        let conn = self.read_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT name, lon, lat FROM {} WHERE id = ?1", kind.table()),
                [id.get()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<f64>>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(match row {
            Some((name, Some(lon), Some(lat))) => Some(RoutablePoint {
                id,
                name: name.unwrap_or_default(),
                position: GeoPoint::new(lon, lat),
            }),
            Some(_) => {
                debug!("{} {id} has no position", kind.label());
                None
            }
            None => None,
        })
    }

    fn nearest_hub(&self, pos: GeoPoint) -> StoreResult<Option<NearestHub>> {
        let conn = self.read_conn()?;
        let hub = conn
            .query_row(
                "SELECT id, name, lon, lat FROM bus_hubs \
                 WHERE lon IS NOT NULL AND lat IS NOT NULL \
                 ORDER BY (lon - ?1) * (lon - ?1) + (lat - ?2) * (lat - ?2) \
                 LIMIT 1",
                params![pos.lon, pos.lat],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        GeoPoint::new(row.get(2)?, row.get(3)?),
                    ))
                },
            )
            .optional()?;

        Ok(hub.map(|(id, name, hub_pos)| NearestHub {
            hub_id:   PointId(id),
            hub_name: name.unwrap_or_default(),
            dist_m:   pos.distance_m(hub_pos),
        }))
    }
}

// ── ChoiceStore ───────────────────────────────────────────────────────────────

impl ChoiceStore for SqliteStore {
    fn save_choice(&self, choice: &NewChoice) -> StoreResult<i64> {
        let geometry = StoredGeometry::encode(
            &choice.route_geometry,
            self.schema.route_geometry_is_structured,
        )?;
        let geometry_param = if geometry.is_structured() { "json(?6)" } else { "?6" };

        let conn = self.write_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO student_choices \
                 (student_id, college_id, hub_id, chosen_at, route_distance_m, route_time_s, \
                  route_geojson, status, choice_source, notes, updated_at) \
                 VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP, ?4, ?5, {geometry_param}, 'saved', ?7, ?8, \
                  CURRENT_TIMESTAMP)"
            ),
            params![
                choice.student_id,
                choice.college_id.get(),
                choice.hub_id.get(),
                choice.route_distance_m,
                choice.route_time_s,
                geometry.to_sql_text(),
                choice.choice_source.as_str(),
                choice.notes,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(
            "saved choice {id}: student {} college {} hub {} ({})",
            choice.student_id, choice.college_id, choice.hub_id, choice.choice_source
        );
        Ok(id)
    }
}

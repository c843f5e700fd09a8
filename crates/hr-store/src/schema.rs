//! Startup schema detection and schema creation.

use log::info;
use rusqlite::Connection;

use hr_core::{SchemaConfig, SegmentIdColumn};

use crate::StoreResult;

/// Inspects a database once and reports the upstream schema facts every
/// other component relies on.
pub struct SchemaProbe;

impl SchemaProbe {
    /// Detect the segment key column of `ways` and whether
    /// `student_choices.route_geojson` is a JSON column.
    ///
    /// A missing table or column is not an error: the key falls back to
    /// `gid` and the route column counts as text.
    pub fn detect(conn: &Connection) -> StoreResult<SchemaConfig> {
        let way_columns = table_columns(conn, "ways")?;
        let segment_id_column = SegmentIdColumn::pick(way_columns.iter().map(|(name, _)| name.as_str()));

        let route_type = table_columns(conn, "student_choices")?
            .into_iter()
            .find(|(name, _)| name == "route_geojson")
            .map(|(_, declared)| declared)
            .unwrap_or_default();
        let route_geometry_is_structured = SchemaConfig::is_structured_type(&route_type);

        info!("ways segment key column: {segment_id_column}");
        info!(
            "student_choices.route_geojson is {} (declared {:?})",
            if route_geometry_is_structured { "structured" } else { "text" },
            route_type
        );

        Ok(SchemaConfig { segment_id_column, route_geometry_is_structured })
    }
}

/// `(name, declared type)` of every column in `table`; empty if the table
/// does not exist.
fn table_columns(conn: &Connection, table: &str) -> StoreResult<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1)")?;
    let rows = stmt.query_map([table], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

/// Create every table the workspace reads or writes, if absent.
///
/// `ways.the_geom` holds GeoJSON or WKT text.  `route_geojson` is declared
/// `JSON` so a fresh database stores structured routes.
pub fn create_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS ways_vertices_pgr (
             id  INTEGER PRIMARY KEY,
             lon REAL,
             lat REAL
         );
         CREATE TABLE IF NOT EXISTS ways (
             gid      INTEGER PRIMARY KEY,
             source   INTEGER,
             target   INTEGER,
             the_geom TEXT
         );
         CREATE TABLE IF NOT EXISTS bus_hubs (
             id   INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             lon  REAL,
             lat  REAL
         );
         CREATE TABLE IF NOT EXISTS data (
             id   INTEGER PRIMARY KEY,
             name TEXT,
             lon  REAL,
             lat  REAL
         );
         CREATE TABLE IF NOT EXISTS student_choices (
             id               INTEGER PRIMARY KEY AUTOINCREMENT,
             student_id       INTEGER NOT NULL,
             college_id       INTEGER NOT NULL,
             hub_id           INTEGER NOT NULL,
             chosen_at        TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP,
             route_distance_m REAL,
             route_time_s     REAL,
             route_geojson    JSON,
             status           TEXT    NOT NULL DEFAULT 'saved',
             choice_source    TEXT    NOT NULL,
             notes            TEXT    NOT NULL DEFAULT '',
             updated_at       TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP
         );",
    )?;
    Ok(())
}

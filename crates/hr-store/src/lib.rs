//! `hr-store` — SQLite persistence for the hubroute workspace.
//!
//! One database file holds the road network, the routable points and the
//! saved choices:
//!
//! | Table               | Used by                                          |
//! |---------------------|--------------------------------------------------|
//! | `ways_vertices_pgr` | `NetworkStore::nearest_vertex`                   |
//! | `ways`              | `NetworkStore::segment_rows` / `segments`        |
//! | `bus_hubs`          | [`PointStore`] (hubs, nearest hub)               |
//! | `data`              | [`PointStore`] (colleges)                        |
//! | `student_choices`   | [`ChoiceStore`]                                  |
//!
//! [`SchemaProbe`] inspects the file once at startup; the resulting
//! `SchemaConfig` is fixed for the lifetime of a [`SqliteStore`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use hr_store::SqliteStore;
//!
//! let store = SqliteStore::open(Path::new("hubroute.db"), Duration::from_secs(5))?;
//! println!("segments keyed by {}", store.schema().segment_id_column);
//! ```

pub mod choices;
pub mod error;
pub mod geometry;
pub mod points;
pub mod schema;
pub mod sqlite;


pub use choices::{ChoiceSource, ChoiceStore, NewChoice, StoredGeometry};
pub use error::{StoreError, StoreResult};
pub use geometry::parse_line;
pub use points::{NearestHub, PointKind, PointStore, RoutablePoint};
pub use schema::{SchemaProbe, create_schema};
pub use sqlite::SqliteStore;

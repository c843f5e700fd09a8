//! Unit tests for hr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{SegmentId, VertexId};

    #[test]
    fn raw_roundtrip() {
        let id = VertexId::from(42);
        assert_eq!(id.get(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ordering() {
        assert!(SegmentId(0) < SegmentId(1));
        assert!(VertexId(-1) < VertexId(0));
    }

    #[test]
    fn display() {
        assert_eq!(VertexId(7).to_string(), "VertexId(7)");
    }
}

#[cfg(test)]
mod geodesy {
    use geo::{LineString, coord};

    use crate::{GeoPoint, geodesic_length_m};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(31.2357, 30.0444);
        assert!(p.distance_m(p) < 1e-6);
    }

    #[test]
    fn one_degree_of_latitude() {
        // ~1 degree of latitude ≈ 111.2 km
        let a = GeoPoint::new(31.0, 30.0);
        let b = GeoPoint::new(31.0, 31.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn mean_radius_sphere() {
        use geo::{Distance, Haversine, Point};

        // One degree along a meridian is R * pi / 180 with R = 6 371 008.8 m.
        let d = GeoPoint::new(0.0, 0.0).distance_m(GeoPoint::new(0.0, 1.0));
        assert!((d - 111_195.080_2).abs() < 1e-3, "got {d}");

        let (a, b) = (GeoPoint::new(31.2357, 30.0444), GeoPoint::new(29.9187, 31.2001));
        assert_eq!(a.distance_m(b), Haversine.distance(Point::from(a), Point::from(b)));
    }

    #[test]
    fn validity() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(GeoPoint::new(-180.0, 90.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(181.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -90.5).is_valid());
    }

    #[test]
    fn coord_conversion_keeps_axis_order() {
        let c: geo::Coord<f64> = GeoPoint::new(31.2, 30.0).into();
        assert_eq!(c.x, 31.2);
        assert_eq!(c.y, 30.0);
        assert_eq!(GeoPoint::from(c), GeoPoint::new(31.2, 30.0));
    }

    #[test]
    fn line_length_sums_pieces() {
        let line = LineString::new(vec![
            coord! { x: 31.0, y: 30.0 },
            coord! { x: 31.0, y: 30.5 },
            coord! { x: 31.0, y: 31.0 },
        ]);
        let whole = GeoPoint::new(31.0, 30.0).distance_m(GeoPoint::new(31.0, 31.0));
        assert!((geodesic_length_m(&line) - whole).abs() < 1e-6);
    }

    #[test]
    fn degenerate_lines_have_zero_length() {
        assert_eq!(geodesic_length_m(&LineString::new(vec![])), 0.0);
        assert_eq!(geodesic_length_m(&LineString::new(vec![coord! { x: 1.0, y: 1.0 }])), 0.0);
    }
}

#[cfg(test)]
mod schema_config {
    use crate::{SchemaConfig, SegmentIdColumn};

    #[test]
    fn priority_order() {
        assert_eq!(SegmentIdColumn::pick(["osm_id", "id", "the_id"]), SegmentIdColumn::Id);
        assert_eq!(SegmentIdColumn::pick(["the_id", "osm_id"]), SegmentIdColumn::OsmId);
        assert_eq!(SegmentIdColumn::pick(["name", "gid", "id"]), SegmentIdColumn::Gid);
    }

    #[test]
    fn defaults_to_gid() {
        assert_eq!(SegmentIdColumn::pick(["name", "source", "target"]), SegmentIdColumn::Gid);
        assert_eq!(SegmentIdColumn::pick(std::iter::empty()), SegmentIdColumn::Gid);
    }

    #[test]
    fn column_match_is_exact() {
        assert_eq!(SegmentIdColumn::from_name("GID"), None);
        assert_eq!(SegmentIdColumn::from_name("osm_id"), Some(SegmentIdColumn::OsmId));
    }

    #[test]
    fn json_type_heuristic() {
        assert!(SchemaConfig::is_structured_type("JSON"));
        assert!(SchemaConfig::is_structured_type("jsonb"));
        assert!(SchemaConfig::is_structured_type("geojson_text"));
        assert!(!SchemaConfig::is_structured_type("TEXT"));
        assert!(!SchemaConfig::is_structured_type(""));
    }
}

#[cfg(test)]
mod route_config {
    use std::io::Write;

    use crate::{CoreError, RouteConfig};

    #[test]
    fn defaults() {
        let c = RouteConfig::default();
        assert_eq!(c.default_speed_kmh, 40.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = RouteConfig::from_toml_str("default_speed_kmh = 55.5").unwrap();
        assert_eq!(c.default_speed_kmh, 55.5);
        assert_eq!(c.busy_timeout_ms, RouteConfig::default().busy_timeout_ms);
    }

    #[test]
    fn rejects_non_positive_default_speed() {
        let err = RouteConfig::from_toml_str("default_speed_kmh = 0.0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = RouteConfig::from_toml_str("speed = 10").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "database = \"campus.db\"\nbusy_timeout_ms = 250").unwrap();
        let c = RouteConfig::load(f.path()).unwrap();
        assert_eq!(c.database.to_str(), Some("campus.db"));
        assert_eq!(c.busy_timeout_ms, 250);
    }
}

#[cfg(test)]
mod error_kind {
    use crate::ErrorKind;

    #[test]
    fn codes_and_statuses() {
        assert_eq!(ErrorKind::NoRoute.code(), "NO_ROUTE");
        assert_eq!(ErrorKind::InvalidGeometry.http_status(), 400);
        assert_eq!(ErrorKind::NoNetwork.http_status(), 404);
        assert_eq!(ErrorKind::NoRoute.http_status(), 404);
        assert!(ErrorKind::StoreUnavailable.is_server_fault());
        assert!(!ErrorKind::NoRoute.is_server_fault());
    }
}

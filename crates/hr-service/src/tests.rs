//! Unit tests for hr-service.

#[cfg(test)]
mod helpers {
    use rusqlite::Connection;
    use tempfile::TempDir;

    use hr_core::{GeoPoint, RouteConfig, SegmentId, VertexId};
    use hr_spatial::{DijkstraRouter, RoadNetwork, RoadNetworkBuilder};
    use hr_store::{SqliteStore, create_schema};

    use crate::RouteService;

    /// ```text
    ///   A(0,0) ──1000 m── B(0,1) ──1000 m── C(0,2)        D(5,5)
    /// ```
    pub fn line_network() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_vertex(VertexId(1), GeoPoint::new(0.0, 0.0));
        let bb = b.add_vertex(VertexId(2), GeoPoint::new(0.0, 1.0));
        let c = b.add_vertex(VertexId(3), GeoPoint::new(0.0, 2.0));
        b.add_vertex(VertexId(4), GeoPoint::new(5.0, 5.0));
        b.add_road_with_length(SegmentId(100), a, bb, 1_000.0);
        b.add_road_with_length(SegmentId(101), bb, c, 1_000.0);
        b.build()
    }

    pub fn memory_service(net: RoadNetwork) -> RouteService<RoadNetwork> {
        RouteService::new(net, DijkstraRouter, RouteConfig::default()).unwrap()
    }

    /// A small network 0.01° per segment, two hubs and two colleges.
    ///
    /// Hub 1 "Ramses" sits next to A; hub 2 "Far" next to the isolated D.
    /// College 10 sits next to C; college 11 has no position.
    pub fn sqlite_service(dir: &TempDir, with_hubs: bool) -> RouteService<SqliteStore> {
        let path = dir.path().join("hubroute.db");
        let conn = Connection::open(&path).unwrap();
        create_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO ways_vertices_pgr (id, lon, lat) VALUES
                 (1, 0.0, 0.0), (2, 0.0, 0.01), (3, 0.0, 0.02), (4, 5.0, 5.0);
             INSERT INTO ways (gid, source, target, the_geom) VALUES
                 (1, 1, 2, 'LINESTRING(0 0, 0 0.01)'),
                 (2, 2, 3, 'LINESTRING(0 0.01, 0 0.02)');
             INSERT INTO data (id, name, lon, lat) VALUES
                 (10, 'Engineering', 0.0, 0.021), (11, 'Nowhere', NULL, NULL);",
        )
        .unwrap();
        if with_hubs {
            conn.execute_batch(
                "INSERT INTO bus_hubs (id, name, lon, lat) VALUES
                     (1, 'Ramses', 0.0, -0.001), (2, 'Far', 5.0, 5.001);",
            )
            .unwrap();
        }
        drop(conn);

        let config = RouteConfig { database: path, ..RouteConfig::default() };
        RouteService::from_config(config).unwrap()
    }

    pub fn choice_count(service: &RouteService<SqliteStore>) -> i64 {
        let conn = Connection::open(service.store().path()).unwrap();
        conn.query_row("SELECT COUNT(*) FROM student_choices", [], |r| r.get(0)).unwrap()
    }

    /// `choice_source` of every saved choice, oldest first.
    pub fn stored_sources(service: &RouteService<SqliteStore>) -> Vec<String> {
        let conn = Connection::open(service.store().path()).unwrap();
        let mut stmt = conn.prepare("SELECT choice_source FROM student_choices ORDER BY id").unwrap();
        stmt.query_map([], |r| r.get(0)).unwrap().collect::<Result<_, _>>().unwrap()
    }
}

// ── compute_route over an in-memory network ───────────────────────────────────

#[cfg(test)]
mod compute {
    use hr_core::{ErrorKind, GeoPoint, RouteConfig, SegmentId, VertexId};
    use hr_spatial::{
        DijkstraRouter, GraphRouter, RoadNetwork, RoadNetworkBuilder, SegmentGraph, SegmentRow,
        ShortestPath, SpatialError,
    };

    use crate::{RouteService, ServiceError};

    use super::helpers::{line_network, memory_service};

    #[test]
    fn a_to_c_at_40_kmh() {
        let svc = memory_service(line_network());
        let r = svc
            .compute_route(GeoPoint::new(0.001, -0.001), GeoPoint::new(0.0, 2.001), Some(40.0))
            .unwrap();
        assert_eq!(r.distance_m, 2_000.0);
        assert!((r.travel_time_s - 180.0).abs() < 1e-9);
        assert!((r.travel_time_min - 3.0).abs() < 1e-9);
        assert_eq!(r.geometry.0.first().map(|c| c.y), Some(0.0));
        assert_eq!(r.geometry.0.last().map(|c| c.y), Some(2.0));
    }

    #[test]
    fn reverse_direction_has_same_distance() {
        let svc = memory_service(line_network());
        let ab = svc.compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 2.0), None).unwrap();
        let ba = svc.compute_route(GeoPoint::new(0.0, 2.0), GeoPoint::new(0.0, 0.0), None).unwrap();
        assert_eq!(ab.distance_m, ba.distance_m);
        assert_eq!(ba.geometry.0.first().map(|c| c.y), Some(2.0));
    }

    #[test]
    fn unusable_speed_uses_default() {
        let config = RouteConfig { default_speed_kmh: 30.0, ..RouteConfig::default() };
        let svc = RouteService::new(line_network(), DijkstraRouter, config).unwrap();
        for speed in [None, Some(0.0), Some(-5.0), Some(f64::NAN)] {
            let r = svc
                .compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 2.0), speed)
                .unwrap();
            assert_eq!(r.speed_kmh, 30.0);
            assert_eq!(r.travel_time_s, 2_000.0 / 1000.0 / 30.0 * 3600.0);
        }
    }

    #[test]
    fn same_vertex_is_zero_route() {
        let svc = memory_service(line_network());
        let r = svc
            .compute_route(GeoPoint::new(0.0, 1.0), GeoPoint::new(0.1, 1.1), Some(50.0))
            .unwrap();
        assert!(r.is_degenerate());
        assert_eq!(r.distance_m, 0.0);
        assert_eq!(r.travel_time_s, 0.0);
        assert_eq!(r.speed_kmh, 50.0);
    }

    #[test]
    fn disconnected_goal_is_no_route() {
        let svc = memory_service(line_network());
        let err = svc
            .compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(5.0, 5.0), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRoute);
    }

    #[test]
    fn empty_network_is_no_network() {
        let svc = memory_service(RoadNetwork::empty());
        let err = svc
            .compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoNetwork);
    }

    #[test]
    fn no_routable_segment_is_no_network() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_vertex(VertexId(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_vertex(VertexId(2), GeoPoint::new(0.0, 1.0));
        b.add_row(SegmentRow {
            id:       SegmentId(1),
            source:   Some(a),
            target:   Some(c),
            geometry: None,
            length_m: None,
        });
        let svc = memory_service(b.build());
        let err = svc
            .compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0), None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Spatial(SpatialError::NoNetwork)));
        assert_eq!(err.kind(), ErrorKind::NoNetwork);
    }

    #[test]
    fn repeated_segment_ids_use_searched_rows() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_vertex(VertexId(1), GeoPoint::new(0.0, 0.0));
        let m = b.add_vertex(VertexId(2), GeoPoint::new(0.0, 0.001));
        let c = b.add_vertex(VertexId(3), GeoPoint::new(0.0, 0.002));
        let far = b.add_vertex(VertexId(4), GeoPoint::new(1.0, 1.0));
        b.add_road_with_length(SegmentId(7), far, c, 99_999.0);
        b.add_road_with_length(SegmentId(7), a, m, 100.0);
        b.add_road_with_length(SegmentId(8), m, c, 100.0);
        let svc = memory_service(b.build());

        let r = svc
            .compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.002), None)
            .unwrap();
        assert_eq!(r.distance_m, 200.0);
        assert_eq!(r.geometry.0.len(), 3);
        assert_eq!(r.geometry.0.last().map(|c| c.y), Some(0.002));
    }

    #[test]
    fn hub_error_reported_first() {
        let svc = memory_service(RoadNetwork::empty());
        let err = svc
            .compute_route(GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(0.0, 0.0), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = RouteConfig { default_speed_kmh: 0.0, ..RouteConfig::default() };
        let err = RouteService::new(line_network(), DijkstraRouter, config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    /// A router that never finds anything.
    struct NoPaths;

    impl GraphRouter for NoPaths {
        fn shortest_path(&self, _: &SegmentGraph, _: VertexId, _: VertexId) -> Option<ShortestPath> {
            None
        }
    }

    #[test]
    fn router_is_pluggable() {
        let svc = RouteService::new(line_network(), NoPaths, RouteConfig::default()).unwrap();
        let err = svc
            .compute_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 2.0), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRoute);
    }
}

// ── Id-based operations over SQLite ───────────────────────────────────────────

#[cfg(test)]
mod by_ids {
    use hr_core::{ErrorKind, GeoPoint, PointId};
    use hr_store::ChoiceSource;

    use crate::{RouteRequest, ServiceError};

    use super::helpers::{choice_count, sqlite_service, stored_sources};

    #[test]
    fn route_between_stored_points() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let r = svc.compute_route_by_ids(PointId(1), PointId(10), Some(40.0)).unwrap();
        let expected = GeoPoint::new(0.0, 0.0).distance_m(GeoPoint::new(0.0, 0.02));
        assert!((r.distance_m - expected).abs() < 1e-6, "got {}", r.distance_m);
        assert_eq!(r.geometry.0.len(), 3);
    }

    #[test]
    fn unknown_or_unplaced_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let err = svc.compute_route_by_ids(PointId(404), PointId(10), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "hub PointId(404) not found");

        let err = svc.compute_route_by_ids(PointId(1), PointId(11), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn request_mixes_ids_and_positions() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let req = RouteRequest {
            hub_id: Some(PointId(1)),
            college_position: Some(GeoPoint::new(0.0, 0.02)),
            speed_kmh: Some(20.0),
            ..RouteRequest::default()
        };
        let r = svc.route(&req).unwrap();
        assert_eq!(r.speed_kmh, 20.0);
        assert!(r.distance_m > 2_000.0);
    }

    #[test]
    fn request_endpoint_validation() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);

        let missing = RouteRequest { college_id: Some(PointId(10)), ..RouteRequest::default() };
        let err = svc.route(&missing).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let both = RouteRequest {
            hub_id: Some(PointId(1)),
            hub_position: Some(GeoPoint::new(0.0, 0.0)),
            college_id: Some(PointId(10)),
            ..RouteRequest::default()
        };
        assert_eq!(svc.route(&both).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn nearest_hub_of_college() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let near = svc.nearest_hub(PointId(10)).unwrap();
        assert_eq!(near.hub_id, PointId(1));
        assert_eq!(near.hub_name, "Ramses");
        assert!(near.dist_m > 2_000.0 && near.dist_m < 3_000.0);

        assert_eq!(svc.nearest_hub(PointId(999)).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn nearest_hub_without_hubs() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, false);
        let err = svc.nearest_hub(PointId(10)).unwrap_err();
        assert!(matches!(err, ServiceError::NoHub));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn save_choice_picks_nearest_hub() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let saved = svc.save_choice(7, PointId(10), None, None, "first pick").unwrap();
        assert_eq!(saved.hub_id, PointId(1));
        assert_eq!(saved.choice_source, ChoiceSource::Auto);
        assert_eq!(saved.choice_id, 1);
        assert_eq!(
            saved.route_time_s,
            saved.route_distance_m / 1000.0 / svc.config().default_speed_kmh * 3600.0
        );
        assert_eq!(choice_count(&svc), 1);
    }

    #[test]
    fn save_choice_with_given_hub_is_manual() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let saved = svc.save_choice(7, PointId(10), Some(PointId(1)), None, "").unwrap();
        assert_eq!(saved.choice_source, ChoiceSource::Manual);
    }

    #[test]
    fn caller_choice_source_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        for (given, expected) in [
            (" AUTO ", ChoiceSource::Auto),
            ("manual", ChoiceSource::Manual),
            ("bogus", ChoiceSource::Manual),
            ("", ChoiceSource::Manual),
        ] {
            let saved = svc.save_choice(7, PointId(10), Some(PointId(1)), Some(given), "").unwrap();
            assert_eq!(saved.choice_source, expected, "{given:?}");
        }
        assert_eq!(stored_sources(&svc), vec!["auto", "manual", "manual", "manual"]);
    }

    #[test]
    fn auto_resolved_hub_overrides_caller_source() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let saved = svc.save_choice(7, PointId(10), None, Some("manual"), "").unwrap();
        assert_eq!(saved.choice_source, ChoiceSource::Auto);
        assert_eq!(stored_sources(&svc), vec!["auto"]);
    }

    #[test]
    fn null_geometries_are_no_network() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let conn = rusqlite::Connection::open(svc.store().path()).unwrap();
        conn.execute("UPDATE ways SET the_geom = NULL", []).unwrap();
        drop(conn);

        let err = svc.compute_route_by_ids(PointId(1), PointId(10), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoNetwork);
        let err = svc.save_choice(7, PointId(10), None, None, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoNetwork);
        assert_eq!(choice_count(&svc), 0);
    }

    #[test]
    fn failed_route_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, true);
        let err = svc.save_choice(7, PointId(10), Some(PointId(2)), None, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRoute);
        assert_eq!(choice_count(&svc), 0);
    }

    #[test]
    fn save_choice_without_hubs_is_validation() {
        let dir = tempfile::tempdir().unwrap();
        let svc = sqlite_service(&dir, false);
        let err = svc.save_choice(7, PointId(10), None, None, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(choice_count(&svc), 0);
    }
}

// ── Wire shapes ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod api {
    use serde_json::json;

    use hr_core::{GeoPoint, PointId};
    use hr_spatial::{RouteResult, SpatialError};

    use crate::{Envelope, RouteRequest, RouteResponse, ServiceError};

    #[test]
    fn request_is_camel_case() {
        let req: RouteRequest = serde_json::from_value(json!({
            "hubId": 3,
            "collegePosition": { "lon": 31.21, "lat": 30.02 },
            "speedKmh": 30.0
        }))
        .unwrap();
        assert_eq!(req.hub_id, Some(PointId(3)));
        assert_eq!(req.college_position, Some(GeoPoint::new(31.21, 30.02)));
        assert_eq!(req.speed_kmh, Some(30.0));
        assert!(req.hub_position.is_none() && req.college_id.is_none());
    }

    #[test]
    fn response_fields() {
        let route = RouteResult::degenerate(40.0);
        let value = serde_json::to_value(RouteResponse::from(&route)).unwrap();
        assert_eq!(value["geometry"]["type"], "LineString");
        assert_eq!(value["geometry"]["coordinates"], json!([]));
        assert_eq!(value["distanceMeters"], 0.0);
        assert_eq!(value["travelTimeSeconds"], 0.0);
        assert_eq!(value["travelTimeMinutes"], 0.0);
        assert_eq!(value["speedKmh"], 40.0);
    }

    #[test]
    fn envelope_shapes() {
        let ok = serde_json::to_value(Envelope::success(1)).unwrap();
        assert_eq!(ok, json!({ "ok": true, "data": 1 }));

        let err: ServiceError = SpatialError::NoNetwork.into();
        let failed = serde_json::to_value(Envelope::<()>::failure(&err)).unwrap();
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["error"]["code"], "NO_NETWORK");
        assert_eq!(failed["error"]["message"], "the road network has no vertices");
        assert!(failed.get("data").is_none());
    }
}

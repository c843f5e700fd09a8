//! The route service: snap × 2 → shortest path → assembly.

use log::{debug, info};

use hr_core::{GeoPoint, PointId, RouteConfig};
use hr_spatial::{
    DijkstraRouter, GraphRouter, NetworkStore, RouteAssembler, RouteResult, SegmentGraph,
    SpatialError, VertexSnapper,
};
use hr_store::{
    ChoiceSource, ChoiceStore, NearestHub, NewChoice, PointKind, PointStore, SqliteStore,
};

use crate::api::{Endpoint, RouteRequest, SavedChoice};
use crate::error::{ServiceError, ServiceResult};

/// Computes routes between hubs and colleges.
///
/// Holds no per-request state: every call reads the store afresh, so
/// concurrent calls are independent.  Operations that resolve ids need a
/// store that is also a [`PointStore`]; saving choices needs a
/// [`ChoiceStore`].
pub struct RouteService<S, R = DijkstraRouter> {
    store:     S,
    router:    R,
    assembler: RouteAssembler,
    config:    RouteConfig,
}

impl RouteService<SqliteStore, DijkstraRouter> {
    /// Open the configured database with the default router.
    ///
    /// Fails if the database cannot be opened or its schema probed.
    pub fn from_config(config: RouteConfig) -> ServiceResult<Self> {
        config.validate()?;
        let store = SqliteStore::from_config(&config)?;
        Self::new(store, DijkstraRouter, config)
    }
}

impl<S: NetworkStore, R: GraphRouter> RouteService<S, R> {
    pub fn new(store: S, router: R, config: RouteConfig) -> ServiceResult<Self> {
        config.validate()?;
        Ok(Self {
            assembler: RouteAssembler::new(config.default_speed_kmh),
            store,
            router,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Route from `hub` to `college` along the road network.
    ///
    /// `speed_kmh` falls back to the configured default when absent or not
    /// a positive finite number.  If both points snap to the same vertex the
    /// result is the zero-length route.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry`, `NoNetwork` or `StoreUnavailable` from snapping
    /// (hub first).  `NoNetwork` if no segment is routable, `NoRoute` if the
    /// snapped vertices are not connected or the path geometry does not join.
    pub fn compute_route(
        &self,
        hub:       GeoPoint,
        college:   GeoPoint,
        speed_kmh: Option<f64>,
    ) -> ServiceResult<RouteResult> {
        let snapper = VertexSnapper::new(&self.store);
        let (start, goal) = rayon::join(|| snapper.snap(hub), || snapper.snap(college));
        let (start, goal) = (start?, goal?);

        if start == goal {
            debug!("{hub} and {college} snap to the same vertex {start}");
            return Ok(RouteResult::degenerate(self.assembler.resolve_speed(speed_kmh)));
        }

        let graph = SegmentGraph::from_rows(self.store.segment_rows()?);
        if graph.is_empty() {
            return Err(SpatialError::NoNetwork.into());
        }
        let path = self
            .router
            .shortest_path(&graph, start, goal)
            .ok_or(SpatialError::NoRoute { from: start, to: goal })?;
        let route = self.assembler.assemble(&graph, &path, speed_kmh)?;

        info!(
            "route {start} -> {goal}: {:.0} m, {:.1} min at {} km/h",
            route.distance_m, route.travel_time_min, route.speed_kmh
        );
        Ok(route)
    }
}

impl<S: NetworkStore + PointStore, R: GraphRouter> RouteService<S, R> {
    /// Route between a stored hub and a stored college.
    ///
    /// # Errors
    ///
    /// `NotFound` if either id is unknown or has no position, then as
    /// [`compute_route`](Self::compute_route).
    pub fn compute_route_by_ids(
        &self,
        hub_id:     PointId,
        college_id: PointId,
        speed_kmh:  Option<f64>,
    ) -> ServiceResult<RouteResult> {
        let hub = self.position_of(PointKind::Hub, hub_id)?;
        let college = self.position_of(PointKind::College, college_id)?;
        self.compute_route(hub, college, speed_kmh)
    }

    /// Route for a caller request, whose endpoints may be positions or ids.
    pub fn route(&self, request: &RouteRequest) -> ServiceResult<RouteResult> {
        let hub = self.resolve(PointKind::Hub, request.hub()?)?;
        let college = self.resolve(PointKind::College, request.college()?)?;
        self.compute_route(hub, college, request.speed_kmh)
    }

    /// The bus hub closest to a college.
    pub fn nearest_hub(&self, college_id: PointId) -> ServiceResult<NearestHub> {
        let college = self.position_of(PointKind::College, college_id)?;
        self.store
            .nearest_hub(college)?
            .ok_or(ServiceError::NoHub)
    }

    fn resolve(&self, kind: PointKind, endpoint: Endpoint) -> ServiceResult<GeoPoint> {
        match endpoint {
            Endpoint::Position(p) => Ok(p),
            Endpoint::Id(id) => self.position_of(kind, id),
        }
    }

    fn position_of(&self, kind: PointKind, id: PointId) -> ServiceResult<GeoPoint> {
        self.store
            .point(kind, id)?
            .map(|p| p.position)
            .ok_or_else(|| ServiceError::not_found(kind, id))
    }
}

impl<S: NetworkStore + PointStore + ChoiceStore, R: GraphRouter> RouteService<S, R> {
    /// Save a student's choice of college together with its route.
    ///
    /// `choice_source` is read leniently and defaults to
    /// [`ChoiceSource::Manual`].  Without `hub_id` the nearest hub is used
    /// and the choice is recorded as [`ChoiceSource::Auto`] whatever the
    /// caller said.  The route is always computed at the default speed.
    /// Nothing is written if routing fails.
    pub fn save_choice(
        &self,
        student_id:    i64,
        college_id:    PointId,
        hub_id:        Option<PointId>,
        choice_source: Option<&str>,
        notes:         &str,
    ) -> ServiceResult<SavedChoice> {
        let requested = choice_source
            .map_or(ChoiceSource::Manual, |s| ChoiceSource::normalize(s, ChoiceSource::Manual));
        let (hub_id, choice_source) = match hub_id {
            Some(id) => (id, requested),
            None => {
                let near = self.nearest_hub(college_id).map_err(|e| match e {
                    ServiceError::NoHub => ServiceError::Validation("hub could not be resolved".into()),
                    other => other,
                })?;
                debug!("auto-selected {} ({}) for college {college_id}", near.hub_id, near.hub_name);
                (near.hub_id, ChoiceSource::Auto)
            }
        };

        let route = self.compute_route_by_ids(hub_id, college_id, None)?;
        let choice = NewChoice {
            student_id,
            college_id,
            hub_id,
            route_distance_m: route.distance_m,
            route_time_s:     route.travel_time_s,
            route_geometry:   route.geometry,
            choice_source,
            notes:            notes.to_owned(),
        };
        let choice_id = self.store.save_choice(&choice)?;

        Ok(SavedChoice {
            choice_id,
            student_id,
            college_id,
            hub_id,
            choice_source,
            route_distance_m: choice.route_distance_m,
            route_time_s:     choice.route_time_s,
        })
    }
}

//! The one tracking session the service drives, and the routes behind it

use serde::Serialize;
use tracing::info;

use crate::dashboard::DashboardView;
use crate::geo::Coordinates;
use crate::model::{RouteBook, Stop, Vehicle};
use crate::store::{RouteStore, StoreError};
use crate::tracker::{Evaluation, ProgressState, RouteTracker, StopReached};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no route named {0}")]
    UnknownRoute(String),

    #[error("no vehicle with fleet number {0}")]
    UnknownVehicle(String),
}

#[derive(Debug)]
pub struct Session {
    pub route: String,
    pub vehicle: Vehicle,
    pub progress: ProgressState,
    pub last_evaluation: Option<Evaluation>,
}

/// What a position update produced.
#[derive(Debug, Serialize)]
pub struct PositionUpdate {
    pub evaluation: Evaluation,
    pub arrivals: Vec<StopReached>,
    pub view: DashboardView,
}

#[derive(Debug)]
pub struct AppState {
    store: RouteStore,
    session: Session,
}

impl AppState {
    /// Starts on the first route of the book with the first bus of the fleet.
    pub fn new(store: RouteStore) -> Self {
        let route = store.route_names().next().unwrap_or_default().to_string();

        Self {
            store,
            session: Session {
                route,
                vehicle: Vehicle::default_vehicle(),
                progress: ProgressState::default(),
                last_evaluation: None,
            },
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn routes(&self) -> &RouteBook {
        self.store.routes()
    }

    pub fn view(&mut self) -> DashboardView {
        let stops = self.store.stops(&self.session.route).unwrap_or_default();
        let tracker = RouteTracker::new(stops, &mut self.session.progress);

        DashboardView::build(
            &self.session.route,
            self.session.vehicle,
            &tracker,
            self.session.last_evaluation.as_ref(),
        )
    }

    /// Switches route and/or vehicle. Picking a different route starts the trip over.
    pub fn select(
        &mut self,
        route: Option<String>,
        vehicle: Option<String>,
    ) -> Result<DashboardView, SessionError> {
        // check both before touching the session
        let vehicle = match vehicle {
            Some(fleet_number) => Some(
                Vehicle::find(&fleet_number).ok_or(SessionError::UnknownVehicle(fleet_number))?,
            ),
            None => None,
        };
        if let Some(route) = &route {
            if self.store.stops(route).is_none() {
                return Err(SessionError::UnknownRoute(route.clone()));
            }
        }

        if let Some(vehicle) = vehicle {
            self.session.vehicle = vehicle;
        }
        if let Some(route) = route {
            if route != self.session.route {
                info!("switching to route {route}");
                self.session.route = route;
                self.session.progress.reset();
                self.session.last_evaluation = None;
            }
        }

        Ok(self.view())
    }

    /// One evaluation cycle for a fix, or for the lack of one.
    pub fn submit_position(&mut self, position: Option<Coordinates>) -> PositionUpdate {
        let mut arrivals: Vec<StopReached> = Vec::new();

        let stops = self.store.stops(&self.session.route).unwrap_or_default();
        let mut tracker = RouteTracker::new(stops, &mut self.session.progress);
        let evaluation = tracker.evaluate(position, &mut arrivals);

        self.session.last_evaluation = Some(evaluation.clone());

        PositionUpdate {
            evaluation,
            arrivals,
            view: self.view(),
        }
    }

    pub fn reset(&mut self) -> DashboardView {
        info!("trip on {} reset", self.session.route);
        let stops = self.store.stops(&self.session.route).unwrap_or_default();
        RouteTracker::new(stops, &mut self.session.progress).reset();
        self.session.last_evaluation = None;

        self.view()
    }

    pub fn add_route(&mut self, name: &str) -> Result<(), SessionError> {
        Ok(self.store.add_route(name)?)
    }

    pub fn add_stop(&mut self, route: &str, stop: Stop) -> Result<(), SessionError> {
        Ok(self.store.add_stop(route, stop)?)
    }
}

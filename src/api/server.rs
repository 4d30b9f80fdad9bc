use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::session::{AppState, PositionUpdate, SessionError};
use crate::dashboard::DashboardView;
use crate::geo::Coordinates;
use crate::model::{FLEET, RouteBook, Stop, Vehicle};
use crate::store::StoreError;

pub type SharedState = Arc<RwLock<AppState>>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/vehicles", get(get_vehicles))
        .route("/routes", get(get_routes).post(post_route))
        .route("/routes/{name}/stops", post(post_stop))
        .route("/session", get(get_session).put(put_session))
        .route("/session/position", post(post_position))
        .route("/session/reset", post(post_reset))
        .with_state(state)
}

/// Serves until ctrl-c.
pub async fn run_server(state: SharedState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    {
        let state = state.read().await;
        let session = state.session();
        info!(
            "listening on {}, tracking {} with {}",
            addr, session.route, session.vehicle
        );
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("couldn't listen for ctrl-c: {e}");
            }
        })
        .await?;

    info!("server stopped");
    Ok(())
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match &self {
            SessionError::UnknownRoute(_)
            | SessionError::UnknownVehicle(_)
            | SessionError::Store(StoreError::UnknownRoute(_)) => StatusCode::NOT_FOUND,
            SessionError::Store(StoreError::EmptyRouteName) => StatusCode::BAD_REQUEST,
            SessionError::Store(StoreError::DuplicateRoute(_)) => StatusCode::CONFLICT,
            SessionError::Store(_) => {
                error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn get_vehicles() -> Json<&'static [Vehicle]> {
    Json(FLEET.as_slice())
}

async fn get_routes(State(state): State<SharedState>) -> Json<RouteBook> {
    Json(state.read().await.routes().clone())
}

#[derive(Debug, Deserialize)]
pub struct NewRoute {
    pub name: String,
}

async fn post_route(
    State(state): State<SharedState>,
    Json(new_route): Json<NewRoute>,
) -> Result<StatusCode, SessionError> {
    state.write().await.add_route(&new_route.name)?;
    Ok(StatusCode::CREATED)
}

async fn post_stop(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(stop): Json<Stop>,
) -> Result<StatusCode, SessionError> {
    state.write().await.add_stop(&name, stop)?;
    Ok(StatusCode::CREATED)
}

async fn get_session(State(state): State<SharedState>) -> Json<DashboardView> {
    Json(state.write().await.view())
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionSelection {
    pub route: Option<String>,
    pub vehicle: Option<String>,
}

async fn put_session(
    State(state): State<SharedState>,
    Json(selection): Json<SessionSelection>,
) -> Result<Json<DashboardView>, SessionError> {
    let view = state
        .write()
        .await
        .select(selection.route, selection.vehicle)?;
    Ok(Json(view))
}

/// Body is `{"latitude": .., "longitude": ..}`, or `null` while there's no fix.
async fn post_position(
    State(state): State<SharedState>,
    Json(position): Json<Option<Coordinates>>,
) -> Json<PositionUpdate> {
    Json(state.write().await.submit_position(position))
}

async fn post_reset(State(state): State<SharedState>) -> Json<DashboardView> {
    Json(state.write().await.reset())
}

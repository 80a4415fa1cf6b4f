use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::engine::StateError;
use crate::http::server::AppState;
use crate::routing::RoutesSnapshot;
use crate::state::{ActiveState, StateUpdate};

#[derive(Serialize)]
pub struct SystemStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub routes: usize,
    pub active_states: usize,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        routes: state.engine.registry().len(),
        active_states: state.engine.active_states().len(),
    })
}

pub async fn get_routes(State(state): State<AppState>) -> Json<RoutesSnapshot> {
    Json(state.engine.routes())
}

pub async fn get_states(State(state): State<AppState>) -> Json<Vec<ActiveState>> {
    Json(state.engine.active_states().to_vec())
}

pub async fn put_state(
    State(state): State<AppState>,
    Json(update): Json<StateUpdate>,
) -> Response {
    match state.engine.set_state(update) {
        Ok(_) => Json(state.engine.active_states().to_vec()).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected state update");
            let status = match e {
                StateError::UnknownRoute(_) => StatusCode::NOT_FOUND,
                StateError::InvalidRoute { .. } => StatusCode::BAD_REQUEST,
            };
            (status, Json(ErrorBody { error: e.to_string() })).into_response()
        }
    }
}

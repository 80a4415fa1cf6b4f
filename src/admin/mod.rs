//! Runtime control surface.
//!
//! Mounted under the configured admin prefix (default `/__mock`):
//! - `GET /status`: server name, version, route and state counts
//! - `GET /routes`: routes snapshot keyed by method, then pattern
//! - `GET /states`: active states in insertion order
//! - `PUT /states`: apply one `setState` entry, returns the new list

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/routes", get(get_routes))
        .route("/states", get(get_states).put(put_state))
}

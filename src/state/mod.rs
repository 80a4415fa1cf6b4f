//! Active-state subsystem.
//!
//! # Data Flow
//! ```text
//! setState({route, method?, state?})
//!     → manager.rs (insert / update in place / remove)
//!     → new immutable list published atomically
//!
//! Request for a matched route
//!     → manager.rs (first entry for the route whose method matches or is absent)
//!     → tagged Variant, or the route default
//! ```
//!
//! # Design Decisions
//! - One entry per (route, method); an absent method is its own key
//! - Readers take a snapshot; writers never block them
//! - An unknown tag falls back to the default variant with a warning

pub mod manager;

use serde::{Deserialize, Serialize};

use crate::routing::{HttpMethod, RoutePattern};

pub use manager::{StateChange, StateManager};

/// A runtime override selecting which variant answers a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveState {
    #[serde(alias = "path")]
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    pub state: String,
}

/// A `setState` request. Without `state` it removes the matching override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(alias = "path")]
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl StateUpdate {
    pub fn activate(route: impl Into<String>, method: Option<HttpMethod>, state: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            method,
            state: Some(state.into()),
        }
    }

    pub fn clear(route: impl Into<String>, method: Option<HttpMethod>) -> Self {
        Self {
            route: route.into(),
            method,
            state: None,
        }
    }
}

/// Canonical form of a route pattern string, as registered routes display it.
///
/// Empty segments are dropped. A string that is not a valid pattern only
/// loses its outer slashes; it can never match a registered route.
pub fn normalize_route(route: &str) -> String {
    let route = route.trim();
    match RoutePattern::parse(route) {
        Ok(pattern) => pattern.to_string(),
        Err(_) => format!("/{}", route.trim_matches('/')),
    }
}

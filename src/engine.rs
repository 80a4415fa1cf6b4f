//! Request pipeline: matcher → state manager → response resolver.
//!
//! # Responsibilities
//! - Own one registry and one active-state list
//! - Answer (method, path) with a response or not-found
//! - Validate runtime state changes against the registry
//! - Swap the registry atomically on reload
//!
//! # Design Decisions
//! - No process-wide state: engines are plain values, several can coexist
//! - Request-time conditions never error; unmatched requests yield `None`

use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::response::{self, MockResponse};
use crate::routing::pattern::PatternError;
use crate::routing::{HttpMethod, Registry, RoutePattern, RoutesSnapshot};
use crate::state::{ActiveState, StateChange, StateManager, StateUpdate};

/// Errors returned by runtime state changes.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid route `{route}`: {source}")]
    InvalidRoute {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("no registered route matches `{0}`")]
    UnknownRoute(String),
}

/// A mock API: compiled routes plus the current state overrides.
#[derive(Debug)]
pub struct MockEngine {
    registry: ArcSwap<Registry>,
    states: StateManager,
}

impl MockEngine {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: ArcSwap::from_pointee(registry),
            states: StateManager::new(),
        }
    }

    /// Resolve a request. `None` means no route matches (404 without body).
    pub fn handle(&self, method: HttpMethod, path: &str) -> Option<MockResponse> {
        let registry = self.registry.load();
        let matched = registry.match_route(method, path)?;
        let variant = self.states.resolve(&matched.route, method);

        tracing::debug!(
            method = %method,
            path = %path,
            route = %matched.route.pattern(),
            status = variant.status_code,
            "Route matched"
        );
        Some(response::resolve(&variant, &matched.captures))
    }

    /// Apply a `setState` entry.
    ///
    /// Activating a state for a route that no method registers is rejected.
    /// Clearing is always accepted so overrides left behind by a reload can
    /// be removed.
    pub fn set_state(&self, update: StateUpdate) -> Result<StateChange, StateError> {
        if update.state.is_some() {
            let pattern = RoutePattern::parse(&update.route).map_err(|source| StateError::InvalidRoute {
                route: update.route.clone(),
                source,
            })?;
            if !self.registry.load().has_pattern(&pattern) {
                return Err(StateError::UnknownRoute(update.route));
            }
        }
        Ok(self.states.set_state(update))
    }

    pub fn active_states(&self) -> Arc<Vec<ActiveState>> {
        self.states.active_states()
    }

    pub fn routes(&self) -> RoutesSnapshot {
        self.registry.load().snapshot()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.load_full()
    }

    /// Replace the route table. Active states are kept.
    pub fn reload(&self, registry: Registry) {
        let routes = registry.len();
        let dangling: Vec<_> = self
            .states
            .active_states()
            .iter()
            .filter(|s| {
                RoutePattern::parse(&s.route)
                    .map(|p| !registry.has_pattern(&p))
                    .unwrap_or(true)
            })
            .map(|s| s.route.clone())
            .collect();

        self.registry.store(Arc::new(registry));
        tracing::info!(routes, "Route table reloaded");
        if !dangling.is_empty() {
            tracing::warn!(routes = ?dangling, "Active states reference routes that no longer exist");
        }
    }
}

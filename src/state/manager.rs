//! Active-state list and variant selection.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::definition::Variant;
use crate::routing::{HttpMethod, RouteDefinition};
use crate::state::{normalize_route, ActiveState, StateUpdate};

/// Effect of a `set_state` call on the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Added,
    Updated,
    Removed,
    Unchanged,
}

/// Owns the ordered list of active states.
///
/// The list is published as an immutable snapshot, so a request resolving a
/// variant always sees one complete version of it.
#[derive(Debug, Default)]
pub struct StateManager {
    states: ArcSwap<Vec<ActiveState>>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one `setState` entry.
    ///
    /// With a state: replace the tag of the entry with the same route and
    /// method (position kept) or append a new entry. Without a state: remove
    /// that entry if present.
    pub fn set_state(&self, update: StateUpdate) -> StateChange {
        let route = normalize_route(&update.route);
        let mut change = StateChange::Unchanged;

        self.states.rcu(|current| {
            let mut next = Vec::clone(current);
            let position = next
                .iter()
                .position(|s| s.route == route && s.method == update.method);

            change = match (&update.state, position) {
                (Some(state), Some(i)) if next[i].state == *state => StateChange::Unchanged,
                (Some(state), Some(i)) => {
                    next[i].state = state.clone();
                    StateChange::Updated
                }
                (Some(state), None) => {
                    next.push(ActiveState {
                        route: route.clone(),
                        method: update.method,
                        state: state.clone(),
                    });
                    StateChange::Added
                }
                (None, Some(i)) => {
                    next.remove(i);
                    StateChange::Removed
                }
                (None, None) => StateChange::Unchanged,
            };
            Arc::new(next)
        });

        tracing::info!(
            route = %route,
            method = ?update.method,
            state = ?update.state,
            change = ?change,
            "Active state updated"
        );
        change
    }

    /// Current snapshot of the active list, in insertion order.
    pub fn active_states(&self) -> Arc<Vec<ActiveState>> {
        self.states.load_full()
    }

    /// Drop every override.
    pub fn clear(&self) {
        self.states.store(Arc::new(Vec::new()));
    }

    /// Select the variant answering `route` for a request with `method`.
    ///
    /// The first entry for the route whose method equals `method` or is
    /// absent wins. A tag the route does not define falls back to the
    /// default variant.
    pub fn resolve(&self, route: &RouteDefinition, method: HttpMethod) -> Arc<Variant> {
        let snapshot = self.states.load();
        let pattern = route.pattern().to_string();
        let active = snapshot
            .iter()
            .find(|s| s.route == pattern && s.method.map_or(true, |m| m == method));

        match active {
            None => Arc::clone(&route.default),
            Some(active) => match route.state(&active.state) {
                Some(variant) => Arc::clone(variant),
                None => {
                    tracing::warn!(
                        route = %pattern,
                        method = %method,
                        state = %active.state,
                        "Unknown state reference, serving default variant"
                    );
                    Arc::clone(&route.default)
                }
            },
        }
    }
}

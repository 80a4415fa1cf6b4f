//! Route matching logic.
//!
//! # Responsibilities
//! - Compare a concrete request path against every pattern of its method
//! - Capture `[name]` segments
//! - Pick the most specific pattern when several match
//!
//! # Design Decisions
//! - Methods match exactly; files without a method token are registered as GET
//! - Path matching is case-sensitive
//! - Specificity is decided segment by segment: literal > parameter > wildcard,
//!   and a pattern that ends beats one that continues with a wildcard
//! - Equal-specificity candidates cannot exist: the registry rejects them at build

use std::cmp::Ordering;
use std::sync::Arc;

use crate::routing::pattern::{split_path, Captures, RoutePattern};
use crate::routing::registry::{Registry, RouteDefinition};
use crate::routing::HttpMethod;

/// A route selected for a request, with its captured path variables.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteDefinition>,
    pub captures: Captures,
}

/// Order two patterns by specificity; `Greater` means `a` is more specific.
pub fn compare_specificity(a: &RoutePattern, b: &RoutePattern) -> Ordering {
    let mut left = a.segments().iter();
    let mut right = b.segments().iter();
    loop {
        match (left.next(), right.next()) {
            (Some(l), Some(r)) => match l.rank().cmp(&r.rank()) {
                Ordering::Equal => continue,
                decided => return decided,
            },
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
        }
    }
}

impl Registry {
    /// Find the best route for `method` and `path`; `None` means not found.
    pub fn match_route(&self, method: HttpMethod, path: &str) -> Option<RouteMatch> {
        let segments = split_path(path);
        let mut best: Option<RouteMatch> = None;

        for route in self.lookup(method) {
            let Some(captures) = route.pattern().captures(&segments) else {
                continue;
            };
            let better = best.as_ref().map_or(true, |current| {
                compare_specificity(route.pattern(), current.route.pattern()) == Ordering::Greater
            });
            if better {
                best = Some(RouteMatch {
                    route: Arc::clone(route),
                    captures,
                });
            }
        }
        best
    }
}

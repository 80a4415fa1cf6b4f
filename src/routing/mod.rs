//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup / reload):
//!     ParsedDefinition[]
//!     → registry.rs (group by method + pattern, merge state variants)
//!     → reject duplicates, missing defaults, ambiguous shapes
//!     → Freeze as immutable Registry
//!
//! Incoming Request (method, path)
//!     → matcher.rs (candidates for the method, most specific wins)
//!     → Return: RouteMatch (route + captures) or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - No regex: segment-by-segment comparison only
//! - Deterministic: ambiguity is a build error, never a request-time choice

pub mod matcher;
pub mod method;
pub mod pattern;
pub mod registry;

pub use matcher::{compare_specificity, RouteMatch};
pub use method::HttpMethod;
pub use pattern::{Captures, RoutePattern, Segment};
pub use registry::{Registry, RegistryError, RouteDefinition, RoutesSnapshot};

/// Identity of a registered endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub method: HttpMethod,
    pub pattern: RoutePattern,
}

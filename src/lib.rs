//! File-system-declared mock HTTP API.
//!
//! A directory of JSON definition files is compiled into a routing table
//! that answers HTTP requests without a real backend.

// Core
pub mod definition;
pub mod engine;
pub mod response;
pub mod routing;
pub mod state;

// Serving
pub mod admin;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::MockConfig;
pub use engine::MockEngine;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

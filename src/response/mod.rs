//! Response resolution.
//!
//! # Data Flow
//! ```text
//! (Variant, Captures)
//!     → resolver.rs (status + headers copied, body cloned)
//!     → inject (every object key named like a capture gets the captured string)
//!     → MockResponse handed to the HTTP adapter
//! ```
//!
//! # Design Decisions
//! - Injection only touches the body; headers and status are served as parsed
//! - Bodies are acyclic JSON literals, so the walk needs no depth guard

pub mod resolver;

pub use resolver::{inject, resolve, MockResponse};

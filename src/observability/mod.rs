//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (request counters and latency histogram)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the configured level
//! - Request ID flows through the trace layer span
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

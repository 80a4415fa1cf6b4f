//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MockConfig (validated, immutable)
//!     → CLI flags applied on top in main.rs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only route definitions hot-reload
//! - All fields have defaults to allow minimal configs (or none at all)
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AdminConfig, ApiConfig, ListenerConfig, MockConfig, ObservabilityConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};

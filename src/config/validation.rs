//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URL prefixes and value ranges
//! - Check that startup states name a state to activate
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MockConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MockConfig;

/// A semantic problem in an otherwise well-formed config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: `{value}` must start with `/` and must not end with `/`")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("admin.prefix `{prefix}` must not be served under api.base_url `{base_url}`")]
    AdminInsideApi { prefix: String, base_url: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("states[{index}] for `{route}` has no state to activate")]
    EmptyState { index: usize, route: String },
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &MockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    let base_url = config.api.base_url.as_str();
    if base_url != "/" {
        check_prefix(&mut errors, "api.base_url", base_url);
    }
    if config.admin.enabled {
        let prefix = config.admin.prefix.as_str();
        check_prefix(&mut errors, "admin.prefix", prefix);
        if base_url != "/" && is_under(prefix, base_url) {
            errors.push(ValidationError::AdminInsideApi {
                prefix: prefix.to_string(),
                base_url: base_url.to_string(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (index, update) in config.states.iter().enumerate() {
        if update.state.as_deref().map_or(true, str::is_empty) {
            errors.push(ValidationError::EmptyState {
                index,
                route: update.route.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') || value.ends_with('/') {
        errors.push(ValidationError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the definition tree into a registry
//! - Build the engine and apply the configured initial states
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Binding the listener is left to the caller (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;

use crate::config::MockConfig;
use crate::definition::source::{compile, CompileError};
use crate::engine::{MockEngine, StateError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("initial state rejected: {0}")]
    State(#[from] StateError),
}

/// Compile definitions and build a ready-to-serve engine.
pub fn bootstrap(config: &MockConfig) -> Result<Arc<MockEngine>, StartupError> {
    let compiled = compile(&config.api.root_dir, config.api.mode)?;
    let engine = Arc::new(MockEngine::new(compiled.registry));

    for update in &config.states {
        engine.set_state(update.clone())?;
    }

    tracing::info!(
        root = %config.api.root_dir.display(),
        base_url = %config.api.base_url,
        routes = engine.registry().len(),
        skipped_files = compiled.skipped.len(),
        active_states = engine.active_states().len(),
        "Engine ready"
    );
    Ok(engine)
}

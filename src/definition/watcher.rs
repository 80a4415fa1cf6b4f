//! Definition tree watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::definition::source::{compile, CompileMode};
use crate::routing::Registry;

/// A watcher that recompiles the API root whenever a file changes.
pub struct DefinitionWatcher {
    root: PathBuf,
    mode: CompileMode,
    update_tx: mpsc::UnboundedSender<Registry>,
}

impl DefinitionWatcher {
    /// Create a new DefinitionWatcher.
    ///
    /// Returns the watcher and a receiver for freshly compiled registries.
    pub fn new(root: &Path, mode: CompileMode) -> (Self, mpsc::UnboundedReceiver<Registry>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                root: root.to_path_buf(),
                mode,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the tree in a background thread.
    ///
    /// The returned watcher must be kept alive for events to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let root = self.root.clone();
        let mode = self.mode;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Definition change detected, recompiling...");
                        match compile(&root, mode) {
                            Ok(compiled) => {
                                if tx.send(compiled.registry).is_err() {
                                    tracing::debug!("Registry receiver dropped, ignoring change");
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to recompile definitions: {}. Keeping current routes.", e);
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        tracing::info!(root = ?self.root, "Definition watcher started");
        Ok(watcher)
    }
}

//! Mock API server.
//!
//! Serves a directory of JSON definition files as an HTTP API.
//!
//! # Architecture Overview
//!
//! ```text
//!     api/users/[userid].DELETE.404.{ERR}.json
//!              │
//!              ▼
//!     ┌──────────────┐   ┌──────────────┐
//!     │  definition  │──▶│   routing    │  (startup / reload)
//!     │    parser    │   │   registry   │
//!     └──────────────┘   └──────┬───────┘
//!                               │
//!     Client Request            ▼
//!     ───────────────▶ ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!                      │   matcher    │──▶│    state     │──▶│   response   │
//!                      │              │   │   manager    │   │   resolver   │
//!     ◀─────────────── └──────────────┘   └──────────────┘   └──────────────┘
//!     Client Response
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use mockroute::config::{load_config, validate_config, ConfigError, MockConfig};
use mockroute::definition::watcher::DefinitionWatcher;
use mockroute::definition::CompileMode;
use mockroute::lifecycle::{bootstrap, Shutdown};
use mockroute::observability::{logging, metrics};
use mockroute::HttpServer;

#[derive(Parser)]
#[command(name = "mockroute")]
#[command(about = "Serve a directory of JSON files as a mock HTTP API", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the definition files.
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Bind address, e.g. 127.0.0.1:6767.
    #[arg(short, long)]
    bind: Option<String>,

    /// URL prefix the API is served under.
    #[arg(long)]
    base_url: Option<String>,

    /// Recompile definitions when files change.
    #[arg(long)]
    watch: bool,

    /// Skip bad definition files instead of refusing to start.
    #[arg(long)]
    lenient: bool,
}

impl Args {
    fn into_config(self) -> Result<MockConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => MockConfig::default(),
        };
        if let Some(root) = self.root {
            config.api.root_dir = root;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(base_url) = self.base_url {
            config.api.base_url = base_url;
        }
        config.api.watch |= self.watch;
        if self.lenient {
            config.api.mode = CompileMode::Lenient;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        root = %config.api.root_dir.display(),
        base_url = %config.api.base_url,
        mode = ?config.api.mode,
        watch = config.api.watch,
        "mockroute starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let engine = bootstrap(&config)?;

    // The watcher handle must outlive the server.
    let (_watcher, registry_updates) = if config.api.watch {
        let (watcher, updates) = DefinitionWatcher::new(&config.api.root_dir, config.api.mode);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(&config, engine);
    server.run(listener, registry_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the admin surface and the mock fallback
//! - Wire up middleware (tracing, timeout, request ID)
//! - Strip the API base URL and hand (method, path) to the engine
//! - Apply registry reloads while serving
//! - Drain gracefully on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::MockConfig;
use crate::engine::MockEngine;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::not_found;
use crate::observability::metrics;
use crate::routing::{HttpMethod, Registry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MockEngine>,
    pub base_url: Arc<str>,
}

/// HTTP server for the mock API.
pub struct HttpServer {
    router: Router,
    engine: Arc<MockEngine>,
}

impl HttpServer {
    /// Create a new HTTP server serving `engine` with the given configuration.
    pub fn new(config: &MockConfig, engine: Arc<MockEngine>) -> Self {
        let state = AppState {
            engine: Arc::clone(&engine),
            base_url: Arc::from(config.api.base_url.as_str()),
        };
        let router = Self::build_router(config, state);
        Self { router, engine }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MockConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.admin.enabled {
            router = router.nest(&config.admin.prefix, admin::router());
        }
        router
            .fallback(mock_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn engine(&self) -> &Arc<MockEngine> {
        &self.engine
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Registries received on `registry_updates` replace the route table.
    /// The server drains and returns once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut registry_updates: mpsc::UnboundedReceiver<Registry>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.engine.registry().len(),
            "HTTP server starting"
        );

        let engine = Arc::clone(&self.engine);
        let reloads = tokio::spawn(async move {
            while let Some(registry) = registry_updates.recv().await {
                engine.reload(registry);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                if shutdown.recv().await.is_err() {
                    tracing::debug!("Shutdown channel closed");
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloads.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Answer every request outside the admin surface from the engine.
async fn mock_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path();

    let response = match (HttpMethod::try_from(&method), strip_base(path, &state.base_url)) {
        (Ok(method), Some(route_path)) => state.engine.handle(method, route_path),
        _ => None,
    };

    match response {
        Some(response) => {
            metrics::record_request(method.as_str(), response.status, true, start_time);
            response.into_response()
        }
        None => {
            tracing::debug!(
                request_id = %request_id(&request),
                method = %method,
                path = %path,
                "No route matched"
            );
            metrics::record_request(method.as_str(), 404, false, start_time);
            not_found()
        }
    }
}

/// Path relative to `base_url`, or `None` when the request is outside it.
fn strip_base<'a>(path: &'a str, base_url: &str) -> Option<&'a str> {
    if base_url == "/" {
        return Some(path);
    }
    match path.strip_prefix(base_url)? {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

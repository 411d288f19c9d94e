//! HTTP server configuration and request routing.
//!
//! Provides the Axum router, shared application state, and graceful
//! shutdown. Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement
//! 4. Handler execution
//!
//! The per-request ID is also the invocation correlation identifier that
//! the promotion handler forwards to the orchestrator in failure reports.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use gantry_cloud::{MessageRelay, ObjectStore, PipelineService, StackInspector};
use gantry_core::Clock;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::{config::Config, handlers};

/// Correlation identifier assigned to each request.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Shared application state injected into all handlers.
///
/// Everything here is read-only after startup; invocations share no
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Validated service configuration.
    pub config: Arc<Config>,
    /// Artifact storage service seam.
    pub object_store: Arc<dyn ObjectStore>,
    /// Pipeline orchestrator seam.
    pub pipeline: Arc<dyn PipelineService>,
    /// Stack and change-set inspection seam.
    pub inspector: Arc<dyn StackInspector>,
    /// Notification relay seam.
    pub relay: Arc<dyn MessageRelay>,
    /// Time source for window arithmetic and timestamps.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Assembles application state from its parts.
    pub fn new(
        config: Arc<Config>,
        object_store: Arc<dyn ObjectStore>,
        pipeline: Arc<dyn PipelineService>,
        inspector: Arc<dyn StackInspector>,
        relay: Arc<dyn MessageRelay>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { config, object_store, pipeline, inspector, relay, clock }
    }
}

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout);

    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/live", get(handlers::liveness_check));

    let api_routes = Router::new()
        .route("/slack/commands", post(handlers::slash_command))
        .route("/pipeline/jobs", post(handlers::promote_artifact))
        .route("/pipeline/approvals", post(handlers::approval_notification));

    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject a request ID into the request and response.
///
/// Adds an X-Request-Id header for tracing requests across services.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4().to_string());

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.0.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

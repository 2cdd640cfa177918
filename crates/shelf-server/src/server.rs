use std::net::SocketAddr;

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower::layer::util::{Identity, Stack};
use tower_http::cors::{Any, CorsLayer};

use crate::extractors::token::REFRESH_TOKEN_HEADER;
use crate::handlers::{
    bootstrap::{get_bootstrap, refresh_bootstrap},
    health::health_check,
    invalidate::invalidate_cache,
    metrics::metrics_handler,
    response::{BUNDLE_VERSION_HEADER, CACHE_HEADER},
};
use crate::middleware::{LoggingLayer, REQUEST_ID_HEADER, RequestIdLayer};
use crate::state::AppState;

/// CORS abierto para el front-end: cualquier origen puede leer el bootstrap.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            REFRESH_TOKEN_HEADER.clone(),
        ])
        .expose_headers([
            CACHE_HEADER.clone(),
            BUNDLE_VERSION_HEADER.clone(),
            REQUEST_ID_HEADER.clone(),
        ])
}

/// Request ID primero, para que el span de logging ya lo tenga.
fn request_layers() -> ServiceBuilder<Stack<LoggingLayer, Stack<RequestIdLayer, Identity>>> {
    ServiceBuilder::new().layer(RequestIdLayer).layer(LoggingLayer)
}

/// Full router: bootstrap, admin, health and metrics.
pub fn create_router_with_state(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    // Bootstrap and admin routes, reachable from browsers
    let api_router = Router::new()
        .route("/api/bootstrap", get(get_bootstrap).post(refresh_bootstrap))
        .route("/api/cache/refresh", post(invalidate_cache))
        .route("/api/cache", delete(invalidate_cache))
        .layer(cors_layer())
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(api_router)
        .merge(metrics_router)
        // HTTP metrics middleware
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(request_layers())
}

/// Health-only router, used when no cache state is available.
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .layer(request_layers())
}

/// Runs the server with the given state and metrics handle.
pub async fn run_server_with_state(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_state(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

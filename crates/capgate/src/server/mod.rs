//! HTTP server: router, middleware stack and graceful shutdown.

mod caller;
mod form;
mod panic;
mod response;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::Router;
use capgate_core::config::ServerConfig;
use capgate_core::Orchestrator;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Parent of every request's cancellation token
    pub shutdown: CancellationToken,
}

/// Assemble routes and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let body_limit = usize::try_from(config.max_upload_mb)
        .unwrap_or(usize::MAX)
        .saturating_mul(1024 * 1024);

    let mut router = routes::router().layer(DefaultBodyLimit::max(body_limit));
    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
        .layer(CatchPanicLayer::custom(response::panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Bind, serve until Ctrl-C, then drain.
pub async fn run(config: &ServerConfig, orchestrator: Orchestrator) -> anyhow::Result<()> {
    panic::install_hook();

    let shutdown = CancellationToken::new();
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        shutdown: shutdown.clone(),
    };
    let app = build_router(state, config);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Capgate listening on http://{}", listener.local_addr()?);

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        tracing::info!("Shutdown signal received");
        signal.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("Server error")?;

    tracing::info!("Capgate stopped");
    Ok(())
}

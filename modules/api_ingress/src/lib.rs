//! HTTP host for the users API.
//!
//! Wraps the routes contributed by feature modules in the shared middleware
//! stack, adds `/health` (and `/openapi.json` when docs are enabled) and runs
//! the server until a shutdown signal arrives.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit, http::StatusCode, middleware::from_fn, routing::get, Extension,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// The HTTP host. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Assemble the final router around `routes`.
    ///
    /// Middleware order, outermost first: SetRequestId → PropagateRequestId →
    /// Trace → push request id into extensions/span → uniform error body →
    /// Timeout → CORS → body limit.
    pub fn build_router(&self, routes: Router, openapi: Option<utoipa::openapi::OpenApi>) -> Router {
        let mut router = routes.route("/health", get(web::health_check));

        match openapi {
            Some(doc) if self.config.enable_docs => {
                tracing::debug!("Serving OpenAPI document at /openapi.json");
                router = router
                    .route("/openapi.json", get(web::openapi_json))
                    .layer(Extension(Arc::new(doc)));
            }
            _ => {}
        }

        // Innermost first: body limit, then CORS
        router = router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let x_request_id = request_id::header();
        let stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                request_id::MakeReqId,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_id::HttpSpan)
                    .on_response(request_id::HttpSpan),
            )
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(from_fn(error::uniform_errors))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(self.config.request_timeout_secs),
            ));

        router.layer(stack)
    }

    /// Bind `addr` and serve `router` until `shutdown` resolves.
    pub async fn serve<F>(&self, router: Router, addr: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid bind address '{addr}'"))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("HTTP server listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
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

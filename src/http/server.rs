//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the health and keep-alive routes
//! - Mount the `/api` aliases for gateway compatibility
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve with graceful shutdown

use axum::{
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::WardenConfig;
use crate::health::HealthAggregator;
use crate::http::handlers;
use crate::scheduler::PingScheduler;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WardenConfig>,
    pub aggregator: Arc<HealthAggregator>,
    pub scheduler: Arc<PingScheduler>,
}

/// UUID v4 request IDs, attached as `x-request-id`.
#[derive(Clone, Copy)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        uuid::Uuid::new_v4().to_string().parse().ok().map(RequestId::new)
    }
}

/// HTTP server for the warden endpoints.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(
        config: Arc<WardenConfig>,
        aggregator: Arc<HealthAggregator>,
        scheduler: Arc<PingScheduler>,
    ) -> Self {
        let state = AppState {
            config: config.clone(),
            aggregator,
            scheduler,
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the router with all routes and middleware layers.
    fn build_router(config: &WardenConfig, state: AppState) -> Router {
        let health_routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/health/ready", get(handlers::readiness))
            .route("/health/live", get(handlers::liveness))
            .route("/health/keepalive", get(handlers::keepalive_status));

        let mut router = Router::new()
            .route("/", get(handlers::banner))
            .merge(health_routes.clone())
            // Alias routes for fleets that reach services through a
            // path-prefixing gateway.
            .nest("/api", health_routes);

        // The manual trigger only exists when a token guards it.
        if config.keep_alive.trigger_token.is_some() {
            router = router.merge(
                Router::new()
                    .route("/health/keepalive/trigger", post(handlers::trigger))
                    .route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        handlers::trigger_auth,
                    )),
            );
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// Run the server, draining on the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout)
//! - Bind server to listener
//! - Graceful shutdown on the lifecycle broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health::HealthProber;
use crate::http::cors::{cors_fallback, cors_layer, CorsPolicy};
use crate::http::handlers;
use crate::http::request::{make_span, MakeRequestUuidV4};
use crate::proxy::ProxyService;

/// Slack on top of the upstream timeout before the inbound request is cut.
const REQUEST_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub proxy: Arc<ProxyService>,
    pub health: Arc<HealthProber>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let proxy = ProxyService::new(&config)?;
        let health = HealthProber::new(&config.health, &config.upstream)?;
        Ok(Self {
            config: Arc::new(config),
            proxy: Arc::new(proxy),
            health: Arc::new(health),
        })
    }
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::new(config)?;
        let config = state.config.clone();
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState) -> Router {
        let cors = Arc::new(CorsPolicy::from_config(&state.config.cors));
        let cors_layer = cors_layer(&state.config.cors);
        let request_timeout = state
            .config
            .upstream
            .timeout()
            .and_then(|t| t.checked_add(REQUEST_TIMEOUT_GRACE))
            .unwrap_or(Duration::MAX);

        Router::new()
            .route("/", get(handlers::root))
            .route("/proxy", get(handlers::proxy))
            .route("/health", get(handlers::health))
            .route("/nbkr/{alias}", get(handlers::alias))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(cors_layer)
            .layer(middleware::from_fn_with_state(cors, cors_fallback))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| make_span(req)))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The configured router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            allowed_domains = ?self.config.policy.allowed_domains,
            allowed_origins = ?self.config.cors.allowed_origins,
            timeout_secs = self.config.upstream.timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with gateway and operator handlers
//! - Wire up middleware (tracing, trace id)
//! - Serve on a bound listener until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;

use axum::{middleware, routing::any, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::auth::{BasicCredentials, IdentityVerifier};
use crate::config::ForwardingConfig;
use crate::http::gateway::gateway;
use crate::http::request::assign_trace_id;
use crate::routing::RouteCache;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub cache: Arc<RouteCache>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub client: reqwest::Client,
    pub forwarding: ForwardingConfig,
    /// Operator credentials; `None` leaves the reset endpoint open.
    pub operator: Option<BasicCredentials>,
}

impl GatewayState {
    pub fn new(cache: Arc<RouteCache>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            cache,
            verifier,
            client: reqwest::Client::new(),
            forwarding: ForwardingConfig::default(),
            operator: None,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_forwarding(mut self, forwarding: ForwardingConfig) -> Self {
        self.forwarding = forwarding;
        self
    }

    pub fn with_operator(mut self, operator: Option<BasicCredentials>) -> Self {
        self.operator = operator;
        self
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("cache", &self.cache)
            .field("forwarding", &self.forwarding)
            .field("operator", &self.operator)
            .finish_non_exhaustive()
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    pub fn new(state: GatewayState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// The fully layered router, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/gateway/{appname}", any(gateway))
        .route("/gateway/{appname}/", any(gateway))
        .route("/gateway/{appname}/{*path}", any(gateway))
        .merge(admin::router(state.clone()))
        .with_state(state)
        .layer(middleware::from_fn(assign_trace_id))
        .layer(TraceLayer::new_for_http())
}

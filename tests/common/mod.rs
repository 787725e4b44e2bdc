//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use authgateway::auth::{BasicCredentials, JwtAuthority};
use authgateway::config::ForwardingConfig;
use authgateway::http::{build_router, GatewayState};
use authgateway::routing::{RouteCache, DEFAULT_OWNER};
use authgateway::source::{ConfigEntry, MemoryConfigSource};

pub const SECRET: &str = "integration-secret";
pub const ENVIRONMENT: &str = "test";
pub const OPERATOR_USER: &str = "operator";
pub const OPERATOR_PASSWORD: &str = "operator-pw";

/// Start a mock backend on an ephemeral port.
///
/// Echoes method, path, query, headers and JSON body. Paths ending in
/// `/status/<code>`, `/empty`, `/html` or `/text-error` return canned answers.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn echo(request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path().to_string();

    if let Some(code) = path
        .rsplit_once("/status/")
        .and_then(|(_, code)| code.parse::<u16>().ok())
    {
        let status = StatusCode::from_u16(code).unwrap();
        return (status, [("x-backend", "echo")], Json(json!({ "status": code }))).into_response();
    }
    if path.ends_with("/empty") {
        return StatusCode::NO_CONTENT.into_response();
    }
    if path.ends_with("/html") {
        return (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], "<html></html>")
            .into_response();
    }
    if path.ends_with("/text-error") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded").into_response();
    }

    let headers: BTreeMap<String, String> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (
        [
            ("x-trace-id", "backend-trace"),
            ("x-backend", "echo"),
            ("set-cookie", "session=1"),
            ("server", "mock"),
        ],
        Json(json!({
            "method": parts.method.as_str(),
            "path": path,
            "query": parts.uri.query(),
            "headers": headers,
            "body": body,
        })),
    )
        .into_response()
}

/// Property-store entries routing `orders` and `billing` to `backend`.
///
/// `orders` has backend credentials, `billing` does not.
pub fn gateway_entries(backend: &str) -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::map(
            format!("baseUrls_{}", ENVIRONMENT),
            [
                ("/orders/api".to_string(), backend.to_string()),
                ("/billing/v1".to_string(), format!("{}/", backend)),
            ],
        ),
        ConfigEntry::list("authExclusions", ["/gateway/orders/public"]),
        ConfigEntry::map(
            "authConfigs",
            [("orders-usr", "svc-user"), ("orders-pwd", "svc-pass")],
        ),
    ]
}

pub fn memory_source(backend: SocketAddr) -> Arc<MemoryConfigSource> {
    Arc::new(MemoryConfigSource::with_entries(
        DEFAULT_OWNER,
        gateway_entries(&format!("http://{}", backend)),
    ))
}

pub fn gateway_state(source: Arc<MemoryConfigSource>) -> GatewayState {
    let cache = Arc::new(RouteCache::new(source, DEFAULT_OWNER, ENVIRONMENT));
    GatewayState::new(cache, Arc::new(JwtAuthority::new(SECRET, 24)))
}

pub fn with_operator(state: GatewayState) -> GatewayState {
    state.with_operator(Some(BasicCredentials::new(OPERATOR_USER, OPERATOR_PASSWORD)))
}

pub fn with_relay(state: GatewayState, relay_backend_errors: bool) -> GatewayState {
    state.with_forwarding(ForwardingConfig { relay_backend_errors })
}

pub fn router(state: GatewayState) -> Router {
    build_router(state)
}

/// Serve `router` on an ephemeral port.
pub async fn spawn_gateway(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn token(username: &str) -> String {
    JwtAuthority::new(SECRET, 24).issue(username, "127.0.0.1").unwrap()
}

pub fn bearer(username: &str) -> String {
    format!("Bearer {}", token(username))
}

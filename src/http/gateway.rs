//! Gateway request pipeline.
//!
//! # Data Flow
//! ```text
//! /gateway/{appname}/{*path}
//!     → OPTIONS? 200, done
//!     → split raw path, reject dot segments             (400)
//!     → snapshot = RouteCache::ensure_populated(false)   (one per request)
//!     → excluded path? skip auth : verify bearer token
//!     → resolve base URL                                 (503 if unknown)
//!     → filter headers, attach backend basic auth
//!     → forward with reqwest                             (502 on transport error)
//!     → keep x- headers, relay status + JSON body
//! ```
//!
//! # Design Decisions
//! - A cache failure makes the exclusion check fail closed
//! - Exclusions match the raw request path, never caller-supplied headers, and
//!   the same raw path is forwarded
//! - Nothing is retried; the caller sees the first outcome

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::auth::{bearer_token, AuthError, Identity};
use crate::http::request::{backend_url, gateway_target, TraceId, TraceIdExt};
use crate::http::response::{stamp_process_time, GatewayError};
use crate::http::server::GatewayState;
use crate::observability::metrics;
use crate::security::headers::{filter_request_headers, filter_response_headers};

/// Metrics label for requests that never resolved to a configured app.
pub const UNROUTED: &str = "unrouted";

/// `/gateway/{appname}`, `/gateway/{appname}/` and `/gateway/{appname}/{*path}`
pub async fn gateway(State(state): State<GatewayState>, request: Request) -> Response {
    let start = Instant::now();
    let trace_id = request.trace_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        "Gateway request received"
    );

    let mut routed = None;
    let mut response = match forward(&state, request, trace_id, &mut routed).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                trace_id = %trace_id,
                path = %path,
                status = e.status().as_u16(),
                error = %e,
                "Gateway request failed"
            );
            e.into_response()
        }
    };

    stamp_process_time(&mut response, start);
    let status = response.status().as_u16();
    // Only configured app names become label values.
    let app = routed.as_deref().unwrap_or(UNROUTED);
    metrics::record_request(method.as_str(), status, app, start);

    tracing::info!(
        trace_id = %trace_id,
        app = %app,
        status = status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Gateway response sent"
    );
    response
}

/// Run the pipeline. `routed` receives the app name once it resolves.
async fn forward(
    state: &GatewayState,
    request: Request,
    trace_id: TraceId,
    routed: &mut Option<String>,
) -> Result<Response, GatewayError> {
    if request.method() == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let (parts, body) = request.into_parts();
    let raw_path = parts.uri.path();
    let target = gateway_target(raw_path)?;

    let populated = state.cache.ensure_populated(false).await;
    let excluded = match &populated {
        Ok(snapshot) => snapshot.is_excluded(raw_path),
        Err(e) => {
            tracing::warn!(
                trace_id = %trace_id,
                error = %e,
                "Route cache unavailable, requiring auth"
            );
            false
        }
    };

    if excluded {
        tracing::debug!(
            trace_id = %trace_id,
            path = %raw_path,
            "Authorization skipped by exclusion"
        );
    } else {
        let identity = authorize(state, &parts.headers)?;
        tracing::debug!(trace_id = %trace_id, username = %identity.username, "Caller authorized");
    }

    let snapshot = populated?;
    let base_url = snapshot
        .base_url(&target.appname)
        .ok_or_else(|| GatewayError::RouteUnavailable(target.appname.clone()))?;
    *routed = Some(target.appname.clone());

    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
    if !body.is_empty() {
        serde_json::from_slice::<serde_json::Value>(&body)
            .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
    }

    let mut headers = filter_request_headers(&parts.headers);
    if !body.is_empty() && !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let url = backend_url(base_url, &target.appname, &target.path, parts.uri.query());
    let mut outbound = state
        .client
        .request(parts.method.clone(), &url)
        .headers(headers);
    if let Some(credentials) = snapshot.credentials_for(&target.appname) {
        outbound = outbound.basic_auth(credentials.username, Some(credentials.password));
    }
    if !body.is_empty() {
        outbound = outbound.body(body);
    }

    tracing::info!(
        trace_id = %trace_id,
        method = %parts.method,
        url = %url,
        "Forwarding to backend"
    );

    let backend = outbound.send().await.map_err(|e| {
        tracing::error!(trace_id = %trace_id, url = %url, error = %e, "Backend request failed");
        GatewayError::BadGateway(e.to_string())
    })?;

    let status = backend.status();
    let response_headers = filter_response_headers(backend.headers());
    let bytes = backend
        .bytes()
        .await
        .map_err(|e| GatewayError::BadGateway(e.to_string()))?;

    tracing::info!(
        trace_id = %trace_id,
        url = %url,
        status = status.as_u16(),
        bytes = bytes.len(),
        "Backend responded"
    );

    if !status.is_success() && !state.forwarding.relay_backend_errors {
        return Err(GatewayError::BadGateway(String::from_utf8_lossy(&bytes).into_owned()));
    }

    relay(status, response_headers, bytes)
}

fn authorize(state: &GatewayState, headers: &HeaderMap) -> Result<Identity, GatewayError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()?;
    let token = bearer_token(provided)?;
    Ok(state.verifier.verify(token, None)?)
}

fn relay(status: StatusCode, headers: HeaderMap, bytes: Bytes) -> Result<Response, GatewayError> {
    let mut response = if bytes.is_empty() {
        Response::new(Body::empty())
    } else {
        serde_json::from_slice::<serde_json::Value>(&bytes).map_err(|e| {
            GatewayError::BadGateway(format!("backend returned a non-JSON body: {}", e))
        })?;
        let mut response = Response::new(Body::from(bytes));
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    };
    *response.status_mut() = status;
    response.headers_mut().extend(headers);
    Ok(response)
}

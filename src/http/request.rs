//! Request-side helpers.
//!
//! # Responsibilities
//! - Assign a random trace id to every inbound request
//! - Split the raw request path into application name and remainder
//! - Build the outbound backend URL
//!
//! # Design Decisions
//! - Trace id added as early as possible for tracing
//! - Original request preserved for logging; a filtered copy is forwarded
//! - The path that was authorized is the path that is forwarded: no decoding
//!   between the two

use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use percent_encoding::percent_decode_str;
use uuid::Uuid;

use crate::http::response::GatewayError;

/// Header echoing the trace id back to the caller.
pub const X_TRACE_ID: &str = "x-trace-id";

/// Per-request trace identifier, stored as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(pub Uuid);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Extension trait to read the trace id from a request.
pub trait TraceIdExt {
    fn trace_id(&self) -> TraceId;
}

impl<B> TraceIdExt for axum::http::Request<B> {
    fn trace_id(&self) -> TraceId {
        self.extensions().get::<TraceId>().copied().unwrap_or_default()
    }
}

/// Middleware inserting a fresh [`TraceId`] and echoing it on the response
/// unless the handler already set one.
pub async fn assign_trace_id(mut request: Request<Body>, next: Next) -> Response {
    let trace_id = TraceId::new();
    request.extensions_mut().insert(trace_id);

    let mut response = next.run(request).await;
    if !response.headers().contains_key(X_TRACE_ID) {
        if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
            response.headers_mut().insert(X_TRACE_ID, value);
        }
    }
    response
}

/// Prefix of every gateway route.
pub const GATEWAY_PREFIX: &str = "/gateway/";

/// Application name and path remainder of a gateway request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTarget {
    /// Decoded application name.
    pub appname: String,
    /// Path after the application name, still percent-encoded.
    pub path: String,
}

/// Split a raw `/gateway/{appname}/{path...}` request path.
///
/// The remainder keeps its percent-encoding so the backend receives exactly
/// what the caller sent. Dot segments, encoded or not, are rejected.
pub fn gateway_target(raw_path: &str) -> Result<GatewayTarget, GatewayError> {
    let invalid = || GatewayError::InvalidPath(raw_path.to_string());

    let rest = raw_path.strip_prefix(GATEWAY_PREFIX).ok_or_else(invalid)?;
    let (raw_app, remainder) = rest.split_once('/').unwrap_or((rest, ""));

    let appname = percent_decode_str(raw_app)
        .decode_utf8()
        .map_err(|_| invalid())?;
    if appname.is_empty() || appname.contains('/') || is_dot_segment(&appname) {
        return Err(invalid());
    }

    let decoded = percent_decode_str(remainder)
        .decode_utf8()
        .map_err(|_| invalid())?;
    if decoded.split(['/', '\\']).any(is_dot_segment) {
        return Err(invalid());
    }

    Ok(GatewayTarget {
        appname: appname.into_owned(),
        path: remainder.to_string(),
    })
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

/// `<base_url>/<appname>/<path>` with a trailing `/` on the base trimmed.
pub fn backend_url(base_url: &str, appname: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), appname);
    if !path.is_empty() {
        url.push('/');
        url.push_str(path.trim_start_matches('/'));
    }
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

//! Header filtering between caller, gateway and backend.
//!
//! # Responsibilities
//! - Strip restricted headers from inbound requests before forwarding
//! - Copy only `x-` prefixed headers from backend responses
//!
//! # Design Decisions
//! - `HeaderName` is already lowercase, so comparisons are case-insensitive
//! - `authorization` is always dropped; backend credentials are attached
//!   separately from the credential map

use axum::http::{HeaderMap, HeaderName};

/// Headers never forwarded to a backend.
pub const RESTRICTED_HEADERS: &[&str] = &[
    "accept-charset",
    "accept-encoding",
    "access-control-request-headers",
    "access-control-request-method",
    "connection",
    "content-length",
    "cookie",
    "cookie2",
    "content-transfer-encoding",
    "date",
    "expect",
    "host",
    "keep-alive",
    "origin",
    "referer",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "user-agent",
    "via",
    "authorization",
];

/// Prefix of response headers copied back to the caller.
pub const RESPONSE_HEADER_PREFIX: &str = "x-";

pub fn is_restricted(name: &HeaderName) -> bool {
    RESTRICTED_HEADERS.contains(&name.as_str())
}

/// Copy every inbound header that is not restricted.
pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_restricted(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Copy backend response headers whose name starts with `x-`.
pub fn filter_response_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers {
        if name.as_str().starts_with(RESPONSE_HEADER_PREFIX) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

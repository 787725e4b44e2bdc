//! Response handling and error translation.
//!
//! # Responsibilities
//! - Map gateway failures to HTTP status codes with a JSON body
//! - Stamp `X-Process-Time` on gateway responses
//!
//! # Design Decisions
//! - Error bodies are always `{"error": "<text>"}`
//! - Transport failures are 502 and never retried

use std::time::Instant;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::AuthError;
use crate::routing::CacheError;

pub const X_PROCESS_TIME: &str = "x-process-time";

/// Failures surfaced to gateway callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    #[error("no route configured for '{0}'")]
    RouteUnavailable(String),

    #[error("route cache unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),

    #[error("{0}")]
    BadGateway(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid request path '{0}'")]
    InvalidPath(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::RouteUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

/// Set `X-Process-Time` to the seconds elapsed since `start`.
pub fn stamp_process_time(response: &mut Response, start: Instant) {
    let elapsed = format!("{:.6}", start.elapsed().as_secs_f64());
    if let Ok(value) = HeaderValue::from_str(&elapsed) {
        response.headers_mut().insert(X_PROCESS_TIME, value);
    }
}

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::server::GatewayState;

/// Require operator basic auth when credentials are configured.
pub async fn operator_auth(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.operator.as_ref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match expected.verify(provided) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                error = %e,
                "Operator authentication failed"
            );
            (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"authgateway\"")],
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

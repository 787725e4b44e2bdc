use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::response::GatewayError;
use crate::http::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct PingStatus {
    pub test: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResetStatus {
    pub reset: &'static str,
    pub generation: u64,
    pub routes: usize,
}

pub async fn ping() -> Json<PingStatus> {
    Json(PingStatus { test: "successful" })
}

/// Force a cache reset and report the new generation.
pub async fn reset(State(state): State<GatewayState>) -> Result<Json<ResetStatus>, GatewayError> {
    tracing::info!(owner = %state.cache.owner(), "Operator requested cache reset");
    let snapshot = state.cache.ensure_populated(true).await?;
    Ok(Json(ResetStatus {
        reset: "successful",
        generation: snapshot.generation,
        routes: snapshot.routes.len(),
    }))
}

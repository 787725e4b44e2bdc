//! Operator endpoints.
//!
//! - `GET /authenv-service/tests/ping`  liveness, always open
//! - `GET /authenv-service/tests/reset` forced cache reset, basic auth when
//!   operator credentials are configured

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use crate::http::server::GatewayState;
use self::auth::operator_auth;
use self::handlers::{ping, reset};

pub const PING_PATH: &str = "/authenv-service/tests/ping";
pub const RESET_PATH: &str = "/authenv-service/tests/reset";

pub fn router(state: GatewayState) -> Router<GatewayState> {
    let guarded = Router::new()
        .route(RESET_PATH, get(reset))
        .route_layer(middleware::from_fn_with_state(state, operator_auth));

    Router::new().route(PING_PATH, get(ping)).merge(guarded)
}

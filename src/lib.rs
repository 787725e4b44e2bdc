//! Authenticating HTTP gateway library.

pub mod admin;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod refresh;
pub mod routing;
pub mod security;
pub mod source;

pub use config::schema::GatewayConfig;
pub use http::{GatewayServer, GatewayState};
pub use lifecycle::Shutdown;
pub use routing::RouteCache;

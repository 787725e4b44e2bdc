//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → request.rs (assign trace id)
//!     → gateway.rs (authorize, resolve, forward)  |  admin (ping, reset)
//!     → response.rs (error mapping, X-Process-Time)
//!     → Send to client
//! ```

pub mod gateway;
pub mod request;
pub mod response;
pub mod server;

pub use request::{TraceId, TraceIdExt, X_TRACE_ID};
pub use response::{GatewayError, X_PROCESS_TIME};
pub use server::{build_router, GatewayServer, GatewayState};

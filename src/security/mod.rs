//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth (bearer token unless excluded)
//!     → headers.rs (drop restricted headers)
//!     → forward to backend
//! Backend response:
//!     → headers.rs (keep x- headers only)
//!     → caller
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input: caller headers never reach a backend unfiltered

pub mod headers;

pub use headers::{filter_request_headers, filter_response_headers, RESTRICTED_HEADERS};

//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigSource::fetch("app_authgateway")
//!     → table.rs (derive routes / exclusions / credentials in one pass)
//!     → CacheSnapshot (immutable, generation-stamped)
//!     → cache.rs (atomic publish, lazy + forced population)
//!     → GatewayHandler reads one snapshot per request
//! ```
//!
//! # Design Decisions
//! - Routes are data, not code: nothing is compiled in at startup
//! - "No such app" (Ok(None)) is distinct from "cache not configured" (Err)
//! - Deterministic: same entries always derive the same snapshot

pub mod cache;
pub mod table;

use thiserror::Error;

use crate::source::SourceError;

pub use cache::{RouteCache, DEFAULT_OWNER};
pub use table::{credentials_for, BackendCredentials, CacheSnapshot};

/// Errors raised while populating the route cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The configuration source failed; the cache stays empty.
    #[error("configuration source failed: {0}")]
    Source(#[from] SourceError),

    /// A well-known entry is absent.
    #[error("configuration entry '{0}' is missing")]
    ConfigurationMissing(String),

    /// A well-known entry holds the wrong kind of value.
    #[error("configuration entry '{name}' should be a {expected}, found {found}")]
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

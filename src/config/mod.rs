//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: APP_ENV, SECRET_KEY, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared by value/Arc with all subsystems
//! ```
//!
//! This is the process configuration. Routes, exclusions and backend
//! credentials are not here: they live in the remote property store and are
//! cached by [`crate::routing`].
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, ConfigSourceConfig, EnvironmentConfig, ForwardingConfig, GatewayConfig,
    ListenerConfig, ObservabilityConfig, OperatorConfig, RefreshConfig, SourceKind,
};

//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the configured [`ConfigSource`]
//! - Assemble the route cache, verifier and operator guard into a [`GatewayState`]
//! - Build the refresh scheduler from the `[refresh]` section
//!
//! # Design Decisions
//! - Fail fast: any construction error is fatal
//! - Nothing here touches the network; the first fetch belongs to the scheduler

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{BasicCredentials, JwtAuthority};
use crate::config::{ConfigSourceConfig, GatewayConfig, OperatorConfig, SourceKind};
use crate::http::server::GatewayState;
use crate::refresh::{DailySchedule, RefreshScheduler};
use crate::routing::RouteCache;
use crate::source::{ConfigSource, FileConfigSource, HttpConfigSource, SourceError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build config source: {0}")]
    Source(#[from] SourceError),

    #[error("invalid refresh checkpoint: {0}")]
    Schedule(#[from] chrono::ParseError),
}

/// Build the source selected by `config.kind`.
pub fn build_source(config: &ConfigSourceConfig) -> Result<Arc<dyn ConfigSource>, SourceError> {
    let source: Arc<dyn ConfigSource> = match config.kind {
        SourceKind::Http => Arc::new(HttpConfigSource::new(config)?),
        SourceKind::File => Arc::new(FileConfigSource::new(&config.path)),
    };
    tracing::info!(kind = ?config.kind, owner = %config.owner, "Config source ready");
    Ok(source)
}

/// Wire the gateway state around `source`.
pub fn build_state(config: &GatewayConfig, source: Arc<dyn ConfigSource>) -> GatewayState {
    let cache = Arc::new(RouteCache::new(
        source,
        config.config_source.owner.clone(),
        config.environment.name.clone(),
    ));
    let verifier = Arc::new(JwtAuthority::new(
        &config.auth.secret_key,
        config.auth.token_ttl_hours,
    ));

    GatewayState::new(cache, verifier)
        .with_forwarding(config.forwarding.clone())
        .with_operator(operator_credentials(&config.operator))
}

pub fn build_scheduler(
    config: &GatewayConfig,
    cache: Arc<RouteCache>,
) -> Result<RefreshScheduler, StartupError> {
    let schedule = DailySchedule::parse(&config.refresh.checkpoints)?;
    Ok(RefreshScheduler::new(
        cache,
        schedule,
        Duration::from_millis(config.refresh.poll_interval_ms),
    ))
}

fn operator_credentials(config: &OperatorConfig) -> Option<BasicCredentials> {
    match (&config.username, &config.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Some(BasicCredentials::new(username.clone(), password.clone()))
        }
        _ => {
            tracing::warn!("Operator credentials not configured, reset endpoint is unguarded");
            None
        }
    }
}

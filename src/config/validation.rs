//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (poll interval, token lifetime)
//! - Check that addresses, URLs and checkpoints parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, SourceKind};
use crate::refresh::schedule::parse_checkpoint;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("environment.name must not be empty")]
    EmptyEnvironment,

    #[error("config_source.owner must not be empty")]
    EmptyOwner,

    #[error("config_source.url '{0}' is not a valid URL")]
    SourceUrl(String),

    #[error("config_source.path must not be empty")]
    EmptySourcePath,

    #[error("auth.secret_key must be set (SECRET_KEY)")]
    MissingSecret,

    #[error("auth.token_ttl_hours must be positive, got {0}")]
    TokenTtl(i64),

    #[error("operator credentials must set both username and password")]
    PartialOperatorCredentials,

    #[error("refresh.checkpoints entry '{0}' is not HH:MM:SS")]
    Checkpoint(String),

    #[error("refresh.poll_interval_ms must be between 1 and 1000, got {0}")]
    PollInterval(u64),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.environment.name.trim().is_empty() {
        errors.push(ValidationError::EmptyEnvironment);
    }

    let source = &config.config_source;
    if source.owner.trim().is_empty() {
        errors.push(ValidationError::EmptyOwner);
    }
    match source.kind {
        SourceKind::Http => {
            if url::Url::parse(&source.url).is_err() {
                errors.push(ValidationError::SourceUrl(source.url.clone()));
            }
        }
        SourceKind::File => {
            if source.path.trim().is_empty() {
                errors.push(ValidationError::EmptySourcePath);
            }
        }
    }

    if config.auth.secret_key.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }
    if config.auth.token_ttl_hours <= 0 {
        errors.push(ValidationError::TokenTtl(config.auth.token_ttl_hours));
    }

    if config.operator.username.is_some() != config.operator.password.is_some() {
        errors.push(ValidationError::PartialOperatorCredentials);
    }

    for checkpoint in &config.refresh.checkpoints {
        if parse_checkpoint(checkpoint).is_err() {
            errors.push(ValidationError::Checkpoint(checkpoint.clone()));
        }
    }
    if config.refresh.poll_interval_ms == 0 || config.refresh.poll_interval_ms > 1000 {
        errors.push(ValidationError::PollInterval(config.refresh.poll_interval_ms));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Authentication helpers used by the gateway and operator endpoints.
//!
//! # Responsibilities
//! - Split `Authorization` headers into scheme and credential
//! - Verify bearer tokens through an [`IdentityVerifier`]
//! - Check HTTP basic credentials for operator endpoints
//!
//! # Design Decisions
//! - Every failure is fail-closed; callers map all of them to 401
//! - Token math lives behind a trait so the gateway never sees signing keys

pub mod basic;
pub mod jwt;

use thiserror::Error;

pub use basic::BasicCredentials;
pub use jwt::{Claims, JwtAuthority};

/// Identity embedded in a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// Errors raised while authenticating a caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("unsupported authorization scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid credentials: {0}")]
    InvalidToken(String),

    #[error("token identity does not match '{expected}'")]
    IdentityMismatch { expected: String },

    #[error("invalid basic credentials")]
    InvalidBasicCredentials,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Validates bearer tokens.
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token`. When `expected_username` is given, the embedded
    /// identity must match it.
    fn verify(&self, token: &str, expected_username: Option<&str>) -> Result<Identity, AuthError>;
}

/// Split `<scheme> <credential>`.
pub fn split_authorization(header: &str) -> Result<(&str, &str), AuthError> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MalformedHeader)?;
    let credential = parts.next().ok_or(AuthError::MalformedHeader)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }
    Ok((scheme, credential))
}

/// Extract the token from a `Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;
    let (scheme, token) = split_authorization(header)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::UnsupportedScheme(scheme.to_string()));
    }
    Ok(token)
}

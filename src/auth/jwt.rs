//! HS256 identity tokens.
//!
//! Tokens carry `{ username, source_ip, exp }` and are valid for
//! `auth.token_ttl_hours` (24 by default).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Identity, IdentityVerifier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub source_ip: String,
    pub exp: i64,
}

/// Mints and verifies identity tokens with a shared secret.
pub struct JwtAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtAuthority {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Mint a token for `username` connecting from `source_ip`.
    pub fn issue(&self, username: &str, source_ip: &str) -> Result<String, AuthError> {
        let claims = Claims {
            username: username.to_string(),
            source_ip: source_ip.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        self.encode(&claims)
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::InvalidToken("token expired".to_string()),
                ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("signature mismatch".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

impl IdentityVerifier for JwtAuthority {
    fn verify(&self, token: &str, expected_username: Option<&str>) -> Result<Identity, AuthError> {
        let claims = self.decode(token)?;
        if let Some(expected) = expected_username {
            if expected != claims.username {
                return Err(AuthError::IdentityMismatch {
                    expected: expected.to_string(),
                });
            }
        }
        Ok(Identity {
            username: claims.username,
        })
    }
}

impl std::fmt::Debug for JwtAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthority").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

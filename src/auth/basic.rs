//! HTTP basic authentication for operator endpoints.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::auth::{split_authorization, AuthError};

/// Expected operator credentials.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check a `Basic <base64(user:password)>` header value.
    pub fn verify(&self, header: Option<&str>) -> Result<(), AuthError> {
        let header = header.ok_or(AuthError::MissingCredentials)?;
        let (scheme, encoded) = split_authorization(header)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::UnsupportedScheme(scheme.to_string()));
        }

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| AuthError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;
        // user-id cannot contain colons, password may
        let (username, password) = decoded.split_once(':').ok_or(AuthError::MalformedHeader)?;

        // Compare both halves even when the first fails.
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        if user_ok && pass_ok {
            Ok(())
        } else {
            Err(AuthError::InvalidBasicCredentials)
        }
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

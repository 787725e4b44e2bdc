//! Snapshot derivation.
//!
//! # Responsibilities
//! - Find the well-known entries in one fetch result
//! - Build route table, exclusion list and credential map in one pass
//! - Reject missing or wrongly-typed entries instead of producing empty views
//!
//! # Design Decisions
//! - A snapshot is immutable; refresh builds a new one
//! - Credential lookup is a pure function over the credential map

use std::collections::{BTreeMap, HashMap};

use crate::routing::CacheError;
use crate::source::ConfigEntry;

/// Entry holding `/<appname>/...` → base URL, suffixed with the environment.
pub const BASE_URLS_PREFIX: &str = "baseUrls_";
/// Entry holding URL substrings that skip bearer authorization.
pub const AUTH_EXCLUSIONS: &str = "authExclusions";
/// Entry holding `<appname>-usr` / `<appname>-pwd` pairs.
pub const AUTH_CONFIGS: &str = "authConfigs";

const USERNAME_SUFFIX: &str = "-usr";
const PASSWORD_SUFFIX: &str = "-pwd";

/// Basic-auth credentials attached to requests for one backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything derived from one fetch of the configuration source.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    /// Fetch number this snapshot was built from (1 for the first fetch).
    pub generation: u64,
    pub entries: Vec<ConfigEntry>,
    pub routes: HashMap<String, String>,
    pub exclusions: Vec<String>,
    pub credentials: BTreeMap<String, String>,
}

impl CacheSnapshot {
    /// Derive all views from `entries` for the given environment.
    pub fn derive(
        generation: u64,
        environment: &str,
        entries: Vec<ConfigEntry>,
    ) -> Result<Self, CacheError> {
        let base_urls_name = format!("{}{}", BASE_URLS_PREFIX, environment);

        let base_urls = find_entry(&entries, &base_urls_name)?;
        let base_urls = base_urls.value.as_map().ok_or_else(|| CacheError::WrongKind {
            name: base_urls_name.clone(),
            expected: "map",
            found: base_urls.value.kind(),
        })?;

        let exclusions = find_entry(&entries, AUTH_EXCLUSIONS)?;
        let exclusions = exclusions.value.as_list().ok_or_else(|| CacheError::WrongKind {
            name: AUTH_EXCLUSIONS.to_string(),
            expected: "list",
            found: exclusions.value.kind(),
        })?;

        let auth_configs = find_entry(&entries, AUTH_CONFIGS)?;
        let auth_configs = auth_configs.value.as_map().ok_or_else(|| CacheError::WrongKind {
            name: AUTH_CONFIGS.to_string(),
            expected: "map",
            found: auth_configs.value.kind(),
        })?;

        let mut routes = HashMap::with_capacity(base_urls.len());
        for (key, base_url) in base_urls {
            match app_name_from_key(key) {
                Some(app) => {
                    routes.insert(app.to_string(), base_url.clone());
                }
                None => {
                    tracing::warn!(
                        key = %key,
                        entry = %base_urls_name,
                        "Skipping base URL key without /<appname>/ prefix"
                    );
                }
            }
        }

        Ok(Self {
            generation,
            routes,
            exclusions: exclusions.to_vec(),
            credentials: auth_configs.clone(),
            entries,
        })
    }

    pub fn base_url(&self, appname: &str) -> Option<&str> {
        self.routes.get(appname).map(String::as_str)
    }

    /// True if any exclusion substring occurs in `request_path`.
    pub fn is_excluded(&self, request_path: &str) -> bool {
        self.exclusions
            .iter()
            .any(|exclusion| request_path.contains(exclusion.as_str()))
    }

    pub fn credentials_for(&self, appname: &str) -> Option<BackendCredentials> {
        credentials_for(appname, &self.credentials)
    }
}

/// Look up `<appname>-usr` / `<appname>-pwd`; both must be non-empty.
pub fn credentials_for(
    appname: &str,
    credential_map: &BTreeMap<String, String>,
) -> Option<BackendCredentials> {
    let username = credential_map.get(&format!("{}{}", appname, USERNAME_SUFFIX))?;
    let password = credential_map.get(&format!("{}{}", appname, PASSWORD_SUFFIX))?;
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some(BackendCredentials {
        username: username.clone(),
        password: password.clone(),
    })
}

/// Text between the first two `/` characters of a base URL key.
fn app_name_from_key(key: &str) -> Option<&str> {
    let start = key.find('/')? + 1;
    let len = key[start..].find('/')?;
    Some(&key[start..start + len])
}

fn find_entry<'a>(entries: &'a [ConfigEntry], name: &str) -> Result<&'a ConfigEntry, CacheError> {
    entries
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| CacheError::ConfigurationMissing(name.to_string()))
}

//! Property service client.
//!
//! # Responsibilities
//! - `GET <base>/<owner>` against the property service
//! - Authenticate with HTTP basic auth when credentials are configured
//! - Map transport, status and decode failures to [`SourceError`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ConfigSourceConfig;
use crate::source::{ConfigEntry, ConfigSource, SourceError};

/// Fetches entries from the remote property service.
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpConfigSource {
    pub fn new(config: &ConfigSourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn owner_url(&self, owner: &str) -> String {
        format!("{}/{}", self.base_url, owner)
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self, owner: &str) -> Result<Vec<ConfigEntry>, SourceError> {
        let url = self.owner_url(owner);
        let mut request = self.client.get(&url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let entries: Vec<ConfigEntry> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        tracing::debug!(
            owner = %owner,
            url = %url,
            count = entries.len(),
            "Fetched configuration entries"
        );
        Ok(entries)
    }
}

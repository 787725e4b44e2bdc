//! TOML file configuration source.
//!
//! The file maps owner names to arrays of entries and is re-read on every
//! fetch, so editing it and triggering a reset is enough to reroute:
//!
//! ```toml
//! [[app_authgateway]]
//! name = "authExclusions"
//! listValue = ["/health"]
//!
//! [[app_authgateway]]
//! name = "baseUrls_development"
//! mapValue = { "/billing/" = "http://localhost:9001" }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::source::{ConfigEntry, ConfigSource, SourceError};

#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn fetch(&self, owner: &str) -> Result<Vec<ConfigEntry>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut owners: HashMap<String, Vec<ConfigEntry>> = toml::from_str(&content)?;
        Ok(owners.remove(owner).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EntryValue;

    #[tokio::test]
    async fn test_reads_owner_entries() {
        let path = std::env::temp_dir().join(format!("entries-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [[app_authgateway]]
            name = "authExclusions"
            listValue = ["/health", "/ping"]

            [[app_authgateway]]
            name = "baseUrls_development"
            mapValue = { "/billing/" = "http://localhost:9001" }

            [[other_app]]
            name = "ignored"
            stringValue = "x"
            "#,
        )
        .unwrap();

        let source = FileConfigSource::new(&path);
        let entries = source.fetch("app_authgateway").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].value,
            EntryValue::List(vec!["/health".to_string(), "/ping".to_string()])
        );

        assert!(source.fetch("missing_owner").await.unwrap().is_empty());
        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileConfigSource::new("/nonexistent/entries.toml");
        assert!(matches!(source.fetch("app_authgateway").await, Err(SourceError::Io(_))));
    }
}

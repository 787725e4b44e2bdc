//! In-process configuration source.
//!
//! Holds entries per owner in memory. Counts fetches and can be switched into
//! a failing mode, which makes it the source of choice for exercising cache
//! population and refresh behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::source::{ConfigEntry, ConfigSource, SourceError};

#[derive(Debug, Default)]
pub struct MemoryConfigSource {
    owners: RwLock<HashMap<String, Vec<ConfigEntry>>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `entries` for a single owner.
    pub fn with_entries(owner: &str, entries: Vec<ConfigEntry>) -> Self {
        let source = Self::new();
        source.replace(owner, entries);
        source
    }

    /// Replace every entry stored for `owner`.
    pub fn replace(&self, owner: &str, entries: Vec<ConfigEntry>) {
        self.owners
            .write()
            .expect("memory source lock poisoned")
            .insert(owner.to_string(), entries);
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every fetch, to widen race windows.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().expect("memory source lock poisoned") = latency;
    }

    /// Number of fetches served so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for MemoryConfigSource {
    async fn fetch(&self, owner: &str) -> Result<Vec<ConfigEntry>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.read().expect("memory source lock poisoned");
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("memory source set to fail".to_string()));
        }

        let owners = self.owners.read().expect("memory source lock poisoned");
        Ok(owners.get(owner).cloned().unwrap_or_default())
    }
}

//! Process-wide route cache.
//!
//! # Responsibilities
//! - Lazily populate from the configuration source on first use
//! - Force a full reset on demand (scheduler, operator)
//! - Serve consistent snapshots to concurrent request handlers
//!
//! # Design Decisions
//! - The current snapshot lives in an `ArcSwapOption`: readers never block and
//!   never observe a half-built snapshot
//! - Population is serialized by one async mutex; lazy callers re-check after
//!   acquiring it, so a cold cache is fetched once however many requests race
//! - A reset publishes "empty" before fetching; a failed fetch leaves it empty
//!   and the next caller tries again

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::routing::table::{BackendCredentials, CacheSnapshot};
use crate::routing::CacheError;
use crate::source::ConfigSource;

/// Default owner name whose entries configure the gateway.
pub const DEFAULT_OWNER: &str = "app_authgateway";

pub struct RouteCache {
    source: Arc<dyn ConfigSource>,
    owner: String,
    environment: String,
    current: ArcSwapOption<CacheSnapshot>,
    populate: Mutex<()>,
    generation: AtomicU64,
}

impl RouteCache {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        owner: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            source,
            owner: owner.into(),
            environment: environment.into(),
            current: ArcSwapOption::empty(),
            populate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// The current snapshot, without triggering population.
    pub fn snapshot(&self) -> Option<Arc<CacheSnapshot>> {
        self.current.load_full()
    }

    /// Return the current snapshot, populating first if the cache is empty or
    /// `force_reset` is set.
    pub async fn ensure_populated(
        &self,
        force_reset: bool,
    ) -> Result<Arc<CacheSnapshot>, CacheError> {
        if !force_reset {
            if let Some(snapshot) = self.current.load_full() {
                return Ok(snapshot);
            }
        }

        let _guard = self.populate.lock().await;

        if !force_reset {
            // Someone else populated while we waited.
            if let Some(snapshot) = self.current.load_full() {
                return Ok(snapshot);
            }
        }

        self.current.store(None);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = match self.source.fetch(&self.owner).await {
            Ok(entries) => CacheSnapshot::derive(generation, &self.environment, entries),
            Err(e) => Err(CacheError::Source(e)),
        };

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.current.store(Some(snapshot.clone()));
                metrics::record_cache_refresh("success", force_reset);
                metrics::record_cache_routes(snapshot.routes.len());
                tracing::info!(
                    owner = %self.owner,
                    environment = %self.environment,
                    generation,
                    forced = force_reset,
                    entries = snapshot.entries.len(),
                    routes = snapshot.routes.len(),
                    exclusions = snapshot.exclusions.len(),
                    "Route cache populated"
                );
                Ok(snapshot)
            }
            Err(e) => {
                metrics::record_cache_refresh("failure", force_reset);
                metrics::record_cache_routes(0);
                tracing::error!(
                    owner = %self.owner,
                    environment = %self.environment,
                    generation,
                    forced = force_reset,
                    error = %e,
                    "Route cache population failed, cache left empty"
                );
                Err(e)
            }
        }
    }

    pub async fn resolve_base_url(&self, appname: &str) -> Result<Option<String>, CacheError> {
        let snapshot = self.ensure_populated(false).await?;
        Ok(snapshot.base_url(appname).map(str::to_string))
    }

    pub async fn is_excluded(&self, request_path: &str) -> Result<bool, CacheError> {
        let snapshot = self.ensure_populated(false).await?;
        Ok(snapshot.is_excluded(request_path))
    }

    pub async fn credentials_for(
        &self,
        appname: &str,
    ) -> Result<Option<BackendCredentials>, CacheError> {
        let snapshot = self.ensure_populated(false).await?;
        Ok(snapshot.credentials_for(appname))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}

impl std::fmt::Debug for RouteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCache")
            .field("owner", &self.owner)
            .field("environment", &self.environment)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .field("populated", &self.current.load().is_some())
            .finish()
    }
}

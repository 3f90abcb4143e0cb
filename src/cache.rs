use crate::config::Settings;
use crate::error::Result;
use crate::github::{self, RepoSource, RepositoryRecord};
use crate::store::{CacheEntry, CacheStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Serves the repository list from the cache while it is fresh and
/// refetches everything once it expires.
pub struct CacheManager<C, S> {
    store: C,
    source: S,
}

impl<C: CacheStore, S: RepoSource> CacheManager<C, S> {
    pub fn new(store: C, source: S) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub async fn load_repos(
        &self,
        settings: &Settings,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepositoryRecord>> {
        let now = chrono::Utc::now().timestamp_millis();
        self.load_repos_at(settings, now, cancel).await
    }

    /// Same as [`load_repos`](Self::load_repos) with an explicit clock (epoch ms)
    pub async fn load_repos_at(
        &self,
        settings: &Settings,
        now: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepositoryRecord>> {
        if let Some(repos) = self.cached(settings, now).await {
            return Ok(repos);
        }

        let repos = github::fetch_all_repos(
            &self.source,
            &settings.organizations,
            settings.token(),
            cancel,
        )
        .await?;

        // Written even when the list is empty
        let entry = CacheEntry::new(repos, now);
        if let Err(e) = self.store.write(&entry).await {
            warn!("Error caching repositories: {e}");
        }

        Ok(entry.repos)
    }

    async fn cached(&self, settings: &Settings, now: i64) -> Option<Vec<RepositoryRecord>> {
        let entry = match self.store.read().await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("Repository cache is empty");
                return None;
            }
            Err(e) => {
                warn!("Error reading repository cache: {e}");
                return None;
            }
        };

        if !entry.is_fresh(now, settings.cache_ttl_ms()) {
            debug!(age_ms = now - entry.timestamp, "Repository cache is stale");
            return None;
        }

        info!(count = entry.repos.len(), "Using cached repositories");
        Some(entry.repos)
    }

    /// Drop the cached list so the next load refetches
    pub async fn invalidate(&self) -> Result<()> {
        self.store.remove().await?;
        info!("Repository cache cleared");
        Ok(())
    }
}

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::github::RepositoryRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Last fetched repository list and when it was fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "cachedRepos")]
    pub repos: Vec<RepositoryRecord>,

    /// Epoch milliseconds
    #[serde(rename = "cacheTimestamp")]
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(repos: Vec<RepositoryRecord>, timestamp: i64) -> Self {
        Self { repos, timestamp }
    }

    /// Fresh while `now - timestamp` does not exceed the TTL
    pub fn is_fresh(&self, now: i64, ttl_ms: i64) -> bool {
        now.saturating_sub(self.timestamp) <= ttl_ms
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings>;
    async fn save(&self, settings: &Settings) -> Result<()>;
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn read(&self) -> Result<Option<CacheEntry>>;
    async fn write(&self, entry: &CacheEntry) -> Result<()>;
    /// Delete the entry; deleting an absent entry succeeds
    async fn remove(&self) -> Result<()>;
}

/// Settings kept in a TOML file
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults on any failure
    pub async fn load_or_default(&self) -> Settings {
        match self.load().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Error loading settings: {e}");
                Settings::default()
            }
        }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Settings> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Settings::from_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(Error::storage(&self.path, e)),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let content = settings.to_toml()?;
        write_file(&self.path, content.as_bytes()).await
    }
}

/// Repository cache kept in a local JSON file
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn read(&self) -> Result<Option<CacheEntry>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(&self.path, e)),
        }
    }

    async fn write(&self, entry: &CacheEntry) -> Result<()> {
        let bytes = serde_json::to_vec(entry)?;
        write_file(&self.path, &bytes).await
    }

    async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(&self.path, e)),
        }
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::storage(dir, e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Error::storage(path, e))
}

/// In-memory stores for tests
#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryCacheStore {
        entry: Mutex<Option<CacheEntry>>,
        writes: AtomicUsize,
        fail_reads: bool,
    }

    impl MemoryCacheStore {
        pub fn with_entry(entry: CacheEntry) -> Self {
            Self {
                entry: Mutex::new(Some(entry)),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_reads: true,
                ..Self::default()
            }
        }

        pub fn entry(&self) -> Option<CacheEntry> {
            self.entry.lock().unwrap().clone()
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CacheStore for MemoryCacheStore {
        async fn read(&self) -> Result<Option<CacheEntry>> {
            if self.fail_reads {
                return Err(Error::storage(
                    "memory",
                    std::io::Error::new(ErrorKind::Other, "read failed"),
                ));
            }
            Ok(self.entry.lock().unwrap().clone())
        }

        async fn write(&self, entry: &CacheEntry) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            *self.entry.lock().unwrap() = Some(entry.clone());
            Ok(())
        }

        async fn remove(&self) -> Result<()> {
            *self.entry.lock().unwrap() = None;
            Ok(())
        }
    }
}

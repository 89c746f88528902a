use crate::{config::Config, Availability};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A stored lookup result together with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub checked_at: DateTime<Utc>,
    #[serde(flatten)]
    pub availability: Availability,
}

impl CacheEntry {
    pub fn new(availability: Availability, checked_at: DateTime<Utc>) -> Self {
        Self { checked_at, availability }
    }

    /// An entry exactly `ttl_seconds` old is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_seconds: u64) -> bool {
        let age = now.signed_duration_since(self.checked_at).num_seconds();
        age >= 0 && age as u64 >= ttl_seconds
    }
}

pub struct CacheService {
    root: PathBuf,
    ttl_seconds: u64,
}

impl CacheService {
    pub fn new(config: &Config) -> Self {
        Self::with_root(&config.cache_dir, config.cache_ttl_seconds)
    }

    pub fn with_root(root: impl AsRef<Path>, ttl_seconds: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ttl_seconds,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn get(&self, domain: &str) -> Option<CacheEntry> {
        self.get_at(domain, Utc::now()).await
    }

    /// Look up a fresh entry, judging its age against `now`.
    ///
    /// Missing, expired and unreadable entries are all a miss. Entries that
    /// fail to parse are removed so the next write starts clean.
    pub async fn get_at(&self, domain: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let path = self.entry_path(domain)?;

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache miss for domain: {}", domain);
                return None;
            }
            Err(e) => {
                warn!("Cache read error for {}: {}", domain, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding corrupt cache entry for {}: {}", domain, e);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove corrupt cache entry {}: {}", path.display(), e);
                }
                return None;
            }
        };

        // Case-insensitive file systems can hand back another key's entry
        if entry.availability.domain() != domain {
            debug!("Cache entry for {} belongs to {}", domain, entry.availability.domain());
            return None;
        }

        if entry.is_expired(now, self.ttl_seconds) {
            debug!("Cache entry for {} expired (checked at {})", domain, entry.checked_at);
            return None;
        }

        debug!("Cache hit for domain: {}", domain);
        Some(entry)
    }

    /// Store an entry, replacing any previous one. Failures only disable caching.
    pub async fn set(&self, domain: &str, entry: &CacheEntry) {
        let Some(path) = self.entry_path(domain) else {
            warn!("Refusing to cache unsafe key: {:?}", domain);
            return;
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            warn!("Failed to create cache directory {}: {}", self.root.display(), e);
            return;
        }

        let contents = match serde_json::to_string_pretty(entry) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to serialize cache entry for {}: {}", domain, e);
                return;
            }
        };

        match tokio::fs::write(&path, contents).await {
            Ok(()) => info!("Cached result for domain: {}", domain),
            Err(e) => warn!("Failed to cache result for {}: {}", domain, e),
        }
    }

    /// File backing `domain`, or `None` for keys that could leave the cache root.
    pub fn entry_path(&self, domain: &str) -> Option<PathBuf> {
        if domain.is_empty()
            || domain.contains("..")
            || domain.contains('/')
            || domain.contains('\\')
            || domain.contains('\0')
        {
            return None;
        }
        Some(self.root.join(format!("{}.json", domain)))
    }
}

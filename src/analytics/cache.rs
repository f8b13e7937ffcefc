//! Local cache for whole-collection snapshots.
//!
//! Entries are stored as `{ ts, data }` JSON blobs under
//! `{namespace}:{entity}:{period}` keys. An entry older than the cache's TTL is
//! a miss, never a stale hit. Storage is best-effort: a failed write only means
//! the next read misses.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::period::Period;
use crate::error::CacheError;
use crate::model::EntityKind;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Raw key/value storage behind a [`CollectionCache`].
pub trait BlobStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, blob: String) -> Result<(), CacheError>;
    fn remove(&self, key: &str);
    fn remove_prefix(&self, prefix: &str);
}

/// In-process store; lost on restart.
pub struct MemoryStore {
    inner: Cache<String, String>,
}

impl MemoryStore {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn write(&self, key: &str, blob: String) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), blob);
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.inner.invalidate(key);
    }

    fn remove_prefix(&self, prefix: &str) {
        let doomed: Vec<Arc<String>> = self
            .inner
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k)
            .collect();

        for key in doomed {
            self.inner.invalidate(key.as_str());
        }
    }
}

/// One JSON file per key under a directory; survives restarts.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            // Every write will fail and be treated as a miss.
            log::warn!("cache dir {} unavailable: {}", dir.display(), e);
        }
        Self { dir }
    }

    fn file_name(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::file_name(key)))
    }
}

impl BlobStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn write(&self, key: &str, blob: String) -> Result<(), CacheError> {
        fs::write(self.path(key), blob).map_err(|source| CacheError::Write {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path(key));
    }

    fn remove_prefix(&self, prefix: &str) {
        let prefix = Self::file_name(prefix);
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };

        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                let _ = fs::remove_file(entry.path());
            }
        }
    }
}

/// `(entity kind, period)` cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub period: Period,
}

impl CacheKey {
    pub fn new(kind: EntityKind, period: Period) -> Self {
        Self { kind, period }
    }

    /// Whole collection, no period narrowing.
    pub fn collection(kind: EntityKind) -> Self {
        Self::new(kind, Period::all())
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    ts: i64,
    data: T,
}

#[derive(Clone)]
pub struct CollectionCache {
    namespace: &'static str,
    ttl: Duration,
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl CollectionCache {
    pub fn new(
        namespace: &'static str,
        ttl: Duration,
        store: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            namespace,
            ttl,
            store,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn storage_key(&self, key: &CacheKey) -> String {
        format!("{}:{}:{}", self.namespace, key.kind, key.period.key())
    }

    fn kind_prefix(&self, kind: EntityKind) -> String {
        format!("{}:{}:", self.namespace, kind)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let storage_key = self.storage_key(key);
        let blob = self.store.read(&storage_key)?;

        let entry: CacheEntry<T> = match serde_json::from_str(&blob) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key = %storage_key, error = %e, "undecodable cache entry");
                self.invalidate(key);
                return None;
            }
        };

        let age = self.clock.now_ms() - entry.ts;
        if age > self.ttl.as_millis() as i64 {
            debug!(key = %storage_key, age_ms = age, "cache entry expired");
            self.invalidate(key);
            return None;
        }

        Some(entry.data)
    }

    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let storage_key = self.storage_key(key);
        if let Err(e) = self.try_set(&storage_key, value) {
            warn!(error = %e, "cache write failed, entry will miss");
            // Never serve the snapshot this write was meant to supersede.
            self.store.remove(&storage_key);
        }
    }

    fn try_set<T: Serialize>(&self, storage_key: &str, value: &T) -> Result<(), CacheError> {
        let entry = CacheEntry {
            ts: self.clock.now_ms(),
            data: value,
        };
        let blob = serde_json::to_string(&entry).map_err(|source| CacheError::Encode {
            key: storage_key.to_string(),
            source,
        })?;
        self.store.write(storage_key, blob)
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.store.remove(&self.storage_key(key));
    }

    /// Drop every period of one entity kind.
    pub fn invalidate_kind(&self, kind: EntityKind) {
        self.store.remove_prefix(&self.kind_prefix(kind));
    }
}

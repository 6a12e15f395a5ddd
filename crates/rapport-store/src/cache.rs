//! # Persistent Cache
//!
//! A bounded, disk-backed memo table. Entries carry the time they were last
//! read or written; once the table grows past its limit the least recently
//! accessed tenth is dropped in a single pass.
//!
//! A cached `None` is a real entry ("looked up, nothing there") and is distinct
//! from a miss.
//!
//! The cache holds no lock of its own. Owners serialize access, e.g. behind a
//! single mutex.
//!
//! ## Document layout
//!
//! ```json
//! { "<key>": { "value": <T or null>, "lastAccessed": "<RFC 3339>" } }
//! ```

use crate::document;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use rapport_core::PhysicalTimeEffects;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    /// No entry for the key
    Miss,
    /// An entry exists; the stored value may itself be empty
    Hit(Option<T>),
}

impl<T> CacheLookup<T> {
    /// Whether an entry was found.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// The stored value, flattening misses and empty hits.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Hit(value) => value,
            Self::Miss => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry<T> {
    value: Option<T>,
    last_accessed: DateTime<Utc>,
}

type CacheDocument<T> = HashMap<String, CacheEntry<T>>;

/// Disk-backed key/value cache with least-recently-accessed eviction.
pub struct PersistentCache<T> {
    path: Option<PathBuf>,
    max_size: usize,
    entries: CacheDocument<T>,
    time: Arc<dyn PhysicalTimeEffects>,
}

impl<T> fmt::Debug for PersistentCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCache")
            .field("path", &self.path)
            .field("max_size", &self.max_size)
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<T> PersistentCache<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Open the cache stored at `path`. A missing or corrupt file yields an
    /// empty cache.
    pub fn open(
        path: impl Into<PathBuf>,
        max_size: usize,
        time: Arc<dyn PhysicalTimeEffects>,
    ) -> Self {
        let path = path.into();
        let entries: CacheDocument<T> = document::load_or_default(&path);
        debug!(path = %path.display(), entries = entries.len(), "Opened persistent cache");
        Self {
            path: Some(path),
            max_size,
            entries,
            time,
        }
    }

    /// A cache that never touches disk.
    pub fn in_memory(max_size: usize, time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self {
            path: None,
            max_size,
            entries: HashMap::new(),
            time,
        }
    }

    /// Look up `key`. A hit refreshes the entry's access time and persists.
    pub fn get(&mut self, key: &str) -> CacheLookup<T> {
        let now = self.time.physical_time();
        let value = match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_accessed = now;
                entry.value.clone()
            }
            None => return CacheLookup::Miss,
        };
        self.persist_soft();
        CacheLookup::Hit(value)
    }

    /// Look up `key` without touching it.
    pub fn peek(&self, key: &str) -> CacheLookup<T> {
        match self.entries.get(key) {
            Some(entry) => CacheLookup::Hit(entry.value.clone()),
            None => CacheLookup::Miss,
        }
    }

    /// Insert or replace `key`. `None` records a known-empty result.
    pub fn update(&mut self, key: impl Into<String>, value: Option<T>) {
        let entry = CacheEntry {
            value,
            last_accessed: self.time.physical_time(),
        };
        self.entries.insert(key.into(), entry);
        self.persist_soft();
    }

    /// Drop the entry for `key`, if any.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.persist_soft();
        }
        removed
    }

    /// Evict least recently accessed entries once over `max_size`.
    ///
    /// Evicts a tenth of `max_size` (at least one), or the whole excess if that
    /// is larger. Ties on access time fall back to key order. Returns the
    /// number of evicted entries.
    pub fn trim(&mut self) -> usize {
        let len = self.entries.len();
        if len <= self.max_size {
            return 0;
        }
        let batch = self.max_size.div_ceil(10).max(1).max(len - self.max_size);

        let mut by_age: Vec<(DateTime<Utc>, String)> = self
            .entries
            .iter()
            .map(|(k, e)| (e.last_accessed, k.clone()))
            .collect();
        by_age.sort();

        for (_, key) in by_age.into_iter().take(batch) {
            self.entries.remove(&key);
        }
        debug!(evicted = batch, remaining = self.entries.len(), "Trimmed persistent cache");
        batch
    }

    /// Trim, then write the whole document.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        self.trim();
        match &self.path {
            Some(path) => document::write_atomic(path, &self.entries),
            None => Ok(()),
        }
    }

    fn persist_soft(&mut self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist cache, keeping in-memory state");
        }
    }

    /// Whether `key` has an entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured size limit.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

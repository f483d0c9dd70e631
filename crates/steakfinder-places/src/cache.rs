//! Short-lived result cache keyed by rounded coordinates.
//!
//! Entries are never evicted; a stale entry is simply overwritten by the next
//! successful search for the same key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use steakfinder_core::{Coordinates, RestaurantRecord};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache lock poisoned")]
    Poisoned,
}

/// Stored search results plus their creation time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Vec<RestaurantRecord>,
    pub timestamp: i64,
}

impl CacheEntry {
    #[must_use]
    pub fn new(data: Vec<RestaurantRecord>, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// Fresh while `now - timestamp < ttl`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) < ttl_ms
    }
}

/// `restaurants_<lat>_<lng>` with both components rounded to 4 decimals.
#[must_use]
pub fn cache_key(coords: Coordinates) -> String {
    format!(
        "restaurants_{:.4}_{:.4}",
        round_key_component(coords.latitude),
        round_key_component(coords.longitude)
    )
}

/// Adding `0.0` turns a rounded `-0.0` into `0.0` so both sides of zero share a key.
fn round_key_component(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0 + 0.0
}

/// Key/value store for [`CacheEntry`] values.
pub trait ResultCache: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Stores `entry`, replacing anything under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backing store cannot be written.
    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError>;
}

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Default)]
pub struct MemoryResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// JSON-file-backed cache. Loaded once on open and rewritten on every put.
#[derive(Debug)]
pub struct FileResultCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl FileResultCache {
    /// Opens `path`, starting empty when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file exists but cannot be read, or
    /// [`CacheError::Json`] if it does not parse.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| CacheError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            serde_json::from_str(&raw).map_err(|e| CacheError::Json {
                path: path.display().to_string(),
                source: e,
            })?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultCache for FileResultCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// The in-memory map only changes once the file write has succeeded.
    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        let mut next = entries.clone();
        next.insert(key.to_string(), entry);

        let serialized = serde_json::to_string_pretty(&next).map_err(|e| CacheError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, serialized).map_err(|e| CacheError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;

        *entries = next;
        Ok(())
    }
}

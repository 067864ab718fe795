use chrono::Utc;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::CacheError;
use crate::types::{ActivityDataset, CacheKey};

/// Default time-to-live of a cached dataset: one hour.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3_600_000);

/// Default number of identities kept by [`MemoryBackend`].
pub const DEFAULT_MEMORY_CAPACITY: usize = 256;

/// A dataset as stored by a backend, stamped with its creation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Owning key; entries written without one are trusted by file name
    #[serde(default)]
    pub key: String,
    /// Creation time in milliseconds since the Unix epoch
    pub ts: i64,
    pub data: ActivityDataset,
}

impl CacheEntry {
    /// Whether the entry is older than `ttl` at `now_ms`. An entry exactly
    /// `ttl` old is still fresh.
    pub fn is_expired(&self, ttl: Duration, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.ts) > ttl_ms
    }
}

/// Storage behind [`CacheManager`].
///
/// Backends only move entries in and out; expiry is decided by the manager.
pub trait CacheBackend: Send + Sync {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;
    fn store(&self, entry: CacheEntry) -> Result<(), CacheError>;
}

/// In-process backend holding the most recently used entries.
pub struct MemoryBackend {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl MemoryBackend {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}

impl CacheBackend for MemoryBackend {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheError::Task(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheError::Task(e.to_string()))?;
        entries.put(CacheKey::for_identity(&entry.key), entry);
        Ok(())
    }
}

/// One JSON document per key under a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<user cache dir>/contribution-pulse`, or a relative `cache` directory
    /// when the platform has no cache dir.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("contribution-pulse"))
            .unwrap_or_else(|| PathBuf::from("cache"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheBackend for FileBackend {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let bytes = match std::fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry = serde_json::from_slice(&bytes)?;
        if !entry.key.is_empty() && entry.key != key.as_str() {
            return Err(CacheError::KeyMismatch {
                expected: key.to_string(),
                found: entry.key,
            });
        }
        Ok(Some(entry))
    }

    fn store(&self, entry: CacheEntry) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&CacheKey::for_identity(&entry.key));
        std::fs::write(path, serde_json::to_vec(&entry)?)?;
        Ok(())
    }
}

/// Keyed dataset cache with lazy TTL expiry.
///
/// Expired entries are reported as absent but left in place; the next `put`
/// for the key overwrites them. Backend failures of any kind read as a miss.
/// There is no locking between a `get` and the following `put`, so two
/// callers missing on the same key both recompute and the last write wins.
pub struct CacheManager {
    backend: Box<dyn CacheBackend>,
    ttl: Duration,
}

impl CacheManager {
    /// Create a new cache manager over `backend` with the default TTL
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Retrieve a fresh dataset from the cache
    pub fn get(&self, key: &CacheKey) -> Option<ActivityDataset> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    /// Retrieve a dataset as if the current time were `now_ms`
    pub fn get_at(&self, key: &CacheKey, now_ms: i64) -> Option<ActivityDataset> {
        match self.backend.load(key) {
            Ok(Some(entry)) if entry.is_expired(self.ttl, now_ms) => {
                log::debug!("cache entry for {} expired (written at {})", key, entry.ts);
                None
            }
            Ok(Some(entry)) => {
                log::debug!("cache hit for {}", key);
                Some(entry.data)
            }
            Ok(None) => {
                log::debug!("cache miss for {}", key);
                None
            }
            Err(e) => {
                log::warn!("ignoring unreadable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    /// Store a dataset in the cache
    pub fn put(&self, key: &CacheKey, data: ActivityDataset) {
        self.put_at(key, data, Utc::now().timestamp_millis());
    }

    /// Store a dataset stamped with `now_ms`
    pub fn put_at(&self, key: &CacheKey, data: ActivityDataset, now_ms: i64) {
        let entry = CacheEntry {
            key: key.to_string(),
            ts: now_ms,
            data,
        };
        if let Err(e) = self.backend.store(entry) {
            log::warn!("failed to write cache entry for {}: {}", key, e);
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(MemoryBackend::default())
    }
}

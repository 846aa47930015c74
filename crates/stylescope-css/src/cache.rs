//! Bounded memoization of per-file match results.
//!
//! Entries are keyed by the content of a stylesheet and the target identity,
//! so a hit is always equivalent to recomputing. Eviction drops the entry
//! inserted longest ago.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::analysis::FileMatches;
use crate::matcher::TargetIdentity;
use crate::source::StyleSheet;

/// Default number of (file, identity) entries kept.
pub const DEFAULT_CAPACITY: usize = 256;

/// Key of one cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    file: String,
    sheet: u64,
    identity: u64,
}

impl CacheKey {
    /// Key for matching `identity` against `sheet`.
    #[must_use]
    pub fn new(sheet: &StyleSheet, identity: &TargetIdentity) -> Self {
        Self {
            file: sheet.id.clone(),
            sheet: sheet.fingerprint(),
            identity: identity.fingerprint(),
        }
    }
}

/// Thread-safe, fixed-capacity match cache.
///
/// Shared by reference between analysis workers.
#[derive(Debug)]
pub struct MatchCache {
    capacity: usize,
    entries: Mutex<IndexMap<CacheKey, Arc<FileMatches>>>,
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MatchCache {
    /// Create a cache holding at most `capacity` entries. A capacity of zero
    /// stores nothing.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity.min(DEFAULT_CAPACITY))),
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a cached result.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<FileMatches>> {
        self.lock().get(key).cloned()
    }

    /// Store a result, evicting the oldest insertions beyond capacity.
    /// Re-inserting a key makes it the newest entry.
    pub fn insert(&self, key: CacheKey, matches: Arc<FileMatches>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        let _ = entries.shift_remove(&key);
        while entries.len() >= self.capacity {
            let _ = entries.shift_remove_index(0);
        }
        let _ = entries.insert(key, matches);
    }

    /// Return the cached result for `key`, computing and storing it on a miss.
    ///
    /// The lock is not held while computing, so two workers missing the same
    /// key both compute; the later insert wins with an identical value.
    pub fn get_or_insert_with(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> FileMatches,
    ) -> Arc<FileMatches> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let matches = Arc::new(compute());
        self.insert(key, Arc::clone(&matches));
        matches
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<CacheKey, Arc<FileMatches>>> {
        // Entries are whole values; a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

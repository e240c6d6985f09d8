//! Bounded memo of resolved permissions per user and minute bucket.
//!
//! Entries are keyed by `(user, bucket)`, so a cached permission set is stale
//! by at most one bucket width. Each entry remembers the role it was loaded
//! for; a lookup under a different role is a miss. A miss replaces only that
//! user's older entries; other users' entries are never touched, which keeps
//! concurrent lookups for different users from evicting each other.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

use bazaar_core::UserId;

use crate::{Permission, Role};

pub const DEFAULT_CAPACITY: usize = 1024;

/// Shared, immutable permission set handed out by the cache.
pub type PermissionSet = Arc<BTreeSet<Permission>>;

/// Unix time truncated to whole minutes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket(i64);

impl TimeBucket {
    pub const WIDTH_SECS: i64 = 60;

    pub fn containing(now: DateTime<Utc>) -> Self {
        Self(now.timestamp().div_euclid(Self::WIDTH_SECS))
    }

    pub fn now() -> Self {
        Self::containing(Utc::now())
    }

    pub fn index(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    user_id: UserId,
    bucket: TimeBucket,
}

#[derive(Debug, Clone)]
struct Entry {
    role: Role,
    permissions: PermissionSet,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

pub struct PermissionCache {
    entries: Mutex<LruCache<CacheKey, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    /// Bumped by `invalidate`/`clear` so a load racing with them is not cached.
    generation: AtomicU64,
}

impl PermissionCache {
    /// Create a cache holding at most `capacity` `(user, bucket)` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Cached set for `(user, bucket)` if it was loaded for `role`, marking it most recently used.
    pub fn get(&self, user_id: UserId, role: &Role, bucket: TimeBucket) -> Option<PermissionSet> {
        self.entries
            .lock()
            .get(&CacheKey { user_id, bucket })
            .filter(|entry| entry.role == *role)
            .map(|entry| entry.permissions.clone())
    }

    /// Return the cached set or run `load` and cache its result.
    ///
    /// `role` is the user's role as read by the caller; an entry cached under
    /// another role is replaced. The lock is not held while `load` runs.
    /// Loader errors are returned as-is and nothing is cached.
    pub fn get_or_load<E>(
        &self,
        user_id: UserId,
        role: &Role,
        bucket: TimeBucket,
        load: impl FnOnce() -> Result<BTreeSet<Permission>, E>,
    ) -> Result<PermissionSet, E> {
        if let Some(hit) = self.get(user_id, role, bucket) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(%user_id, bucket = bucket.index(), "permission cache miss");

        let generation = self.generation.load(Ordering::Acquire);
        let loaded: PermissionSet = Arc::new(load()?);

        let mut entries = self.entries.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            return Ok(loaded);
        }
        let stale: Vec<CacheKey> = entries
            .iter()
            .filter(|(k, _)| k.user_id == user_id && k.bucket < bucket)
            .map(|(k, _)| *k)
            .collect();
        for key in stale {
            entries.pop(&key);
        }
        entries.put(
            CacheKey { user_id, bucket },
            Entry {
                role: role.clone(),
                permissions: loaded.clone(),
            },
        );

        Ok(loaded)
    }

    /// Whether `(user, bucket)` is cached, without touching recency.
    pub fn contains(&self, user_id: UserId, bucket: TimeBucket) -> bool {
        self.entries.lock().contains(&CacheKey { user_id, bucket })
    }

    /// Drop every entry for one user (e.g. after a role change).
    pub fn invalidate(&self, user_id: UserId) -> usize {
        let mut entries = self.entries.lock();
        let keys: Vec<CacheKey> = entries
            .iter()
            .filter(|(k, _)| k.user_id == user_id)
            .map(|(k, _)| *k)
            .collect();
        for key in &keys {
            entries.pop(key);
        }
        self.generation.fetch_add(1, Ordering::Release);
        keys.len()
    }

    /// Drop everything (e.g. after a role's grants change).
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.generation.fetch_add(1, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl core::fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermissionCache")
            .field("stats", &self.stats())
            .finish()
    }
}

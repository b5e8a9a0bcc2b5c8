//! Time-boxed memoization for the resolvers
//!
//! `ResolutionMemo` is the storage: a thread-safe map from a SHA-256 key to a
//! shared value with an absolute expiry. `memoize` wraps a pure function into a
//! `Memoized` callable whose cache key is built from the first `key_arity`
//! arguments only. Expiry is checked on access; nothing runs in the background.

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::ArtifactKind;

/// Hex-encoded SHA-256 of the key arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_parts(parts: &[Vec<u8>]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
            // separator so ("ab", "c") and ("a", "bc") differ
            hasher.update([0u8]);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    /// `None` when `now + ttl` overflows; such entries never expire
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Thread-safe in-memory memoization map with per-entry expiry.
pub struct ResolutionMemo<V> {
    inner: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
}

impl<V> Default for ResolutionMemo<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResolutionMemo<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: CacheKey, value: V, ttl: Duration) -> Arc<V> {
        let value = Arc::new(value);
        self.insert_shared(key, Arc::clone(&value), ttl);
        value
    }

    pub fn insert_shared(&self, key: CacheKey, value: Arc<V>, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        let mut map = self.inner.write();
        map.insert(key, CacheEntry { value, expires_at });
    }

    /// Live value for `key`; expired entries read as absent.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        let now = Instant::now();
        let map = self.inner.read();
        map.get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|_, entry| entry.is_live(now));
        before - map.len()
    }

    pub fn clear(&self) {
        let mut map = self.inner.write();
        map.clear();
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// A single argument that can take part in a cache key.
pub trait CacheArg {
    fn cache_repr(&self) -> Vec<u8>;
}

impl CacheArg for Path {
    /// Raw OS bytes, so non-UTF-8 paths never collide
    fn cache_repr(&self) -> Vec<u8> {
        self.as_os_str().as_encoded_bytes().to_vec()
    }
}

impl CacheArg for PathBuf {
    fn cache_repr(&self) -> Vec<u8> {
        self.as_path().cache_repr()
    }
}

impl CacheArg for str {
    fn cache_repr(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl CacheArg for String {
    fn cache_repr(&self) -> Vec<u8> {
        self.as_str().cache_repr()
    }
}

impl CacheArg for bool {
    fn cache_repr(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl CacheArg for usize {
    fn cache_repr(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl CacheArg for ArtifactKind {
    fn cache_repr(&self) -> Vec<u8> {
        self.as_str().cache_repr()
    }
}

impl<T: CacheArg> CacheArg for Option<T> {
    fn cache_repr(&self) -> Vec<u8> {
        match self {
            Some(value) => {
                let mut repr = b"Some(".to_vec();
                repr.extend(value.cache_repr());
                repr.push(b')');
                repr
            }
            None => b"None".to_vec(),
        }
    }
}

impl<T: CacheArg + ?Sized> CacheArg for &T {
    fn cache_repr(&self) -> Vec<u8> {
        (**self).cache_repr()
    }
}

/// Argument tuple of a memoized function.
pub trait CacheArgs {
    /// One byte string per argument, in declaration order
    fn key_parts(&self) -> Vec<Vec<u8>>;
}

macro_rules! impl_cache_args {
    ($($name:ident),+) => {
        impl<$($name: CacheArg),+> CacheArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn key_parts(&self) -> Vec<Vec<u8>> {
                let ($($name,)+) = self;
                vec![$($name.cache_repr()),+]
            }
        }
    };
}

impl_cache_args!(A);
impl_cache_args!(A, B);
impl_cache_args!(A, B, C);
impl_cache_args!(A, B, C, D);

type MemoFn<A, V> = Box<dyn Fn(&A) -> V + Send + Sync>;

/// A pure function wrapped with a time-boxed cache.
pub struct Memoized<A, V> {
    name: &'static str,
    func: MemoFn<A, V>,
    key_arity: usize,
    ttl: Duration,
    memo: ResolutionMemo<V>,
}

/// Wrap `func` so calls sharing their first `key_arity` arguments within `ttl`
/// reuse the first result.
///
/// Trailing arguments beyond `key_arity` are passed through to `func` but do
/// not distinguish cache entries.
pub fn memoize<A, V, F>(name: &'static str, func: F, key_arity: usize, ttl: Duration) -> Memoized<A, V>
where
    A: CacheArgs,
    F: Fn(&A) -> V + Send + Sync + 'static,
{
    Memoized {
        name,
        func: Box::new(func),
        key_arity,
        ttl,
        memo: ResolutionMemo::new(),
    }
}

impl<A: CacheArgs, V> Memoized<A, V> {
    pub fn call(&self, args: A) -> Arc<V> {
        let key = self.key_for(&args);
        if let Some(value) = self.memo.get(&key) {
            tracing::trace!(cache = self.name, "cache hit");
            return value;
        }

        // Racing callers may both land here; the function is pure, so the
        // second insert overwrites with an equal value.
        tracing::trace!(cache = self.name, "cache miss");
        let value = (self.func)(&args);
        self.memo.insert(key, value, self.ttl)
    }

    pub fn key_for(&self, args: &A) -> CacheKey {
        let parts = args.key_parts();
        let arity = self.key_arity.min(parts.len());
        CacheKey::from_parts(&parts[..arity])
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn invalidate_all(&self) {
        self.memo.clear();
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

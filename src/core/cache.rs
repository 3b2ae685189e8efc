//! Local cache of introspection results, one entry per endpoint.
//!
//! The cache only saves round-trips. Every failure inside it (missing
//! directory, unreadable entry, bad JSON, failed write) is logged at debug
//! level and treated as a miss; none of them reach the caller.

use crate::core::config::CacheKeyPolicy;
use crate::core::error::GqlError;
use crate::core::schema::Schema;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]").expect("static regex"));

/// Byte storage for named cache entries.
pub trait CacheStore {
    fn read(&self, key: &str) -> io::Result<Vec<u8>>;
    fn modified(&self, key: &str) -> io::Result<SystemTime>;
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsCacheStore { root: root.into() }
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl CacheStore for FsCacheStore {
    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.entry_path(key))
    }

    fn modified(&self, key: &str) -> io::Result<SystemTime> {
        fs::metadata(self.entry_path(key))?.modified()
    }

    // Whole-file replace through a rename, so concurrent writers can lose an
    // update but never leave a torn entry.
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", key, std::process::id()));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, self.entry_path(key))
    }
}

/// Entry key for an endpoint under the given policy.
pub fn cache_key(endpoint: &str, policy: CacheKeyPolicy) -> String {
    match policy {
        CacheKeyPolicy::Sanitized => NON_ALPHANUMERIC.replace_all(endpoint, "-").into_owned(),
        CacheKeyPolicy::Hashed => {
            let mut hasher = Sha256::new();
            hasher.update(endpoint.as_bytes());
            format!("{:x}", hasher.finalize())
        }
    }
}

/// An entry written at `modified` is reusable at `now` when it is no older
/// than `ttl`. Entries stamped in the future count as fresh; a zero `ttl`
/// never reuses anything.
pub fn is_fresh(modified: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    if ttl.is_zero() {
        return false;
    }
    match now.duration_since(modified) {
        Ok(age) => age <= ttl,
        Err(_) => true,
    }
}

pub struct SchemaCache<S: CacheStore> {
    store: S,
    ttl: Duration,
    key_policy: CacheKeyPolicy,
}

impl<S: CacheStore> SchemaCache<S> {
    pub fn new(store: S, ttl: Duration, key_policy: CacheKeyPolicy) -> Self {
        SchemaCache {
            store,
            ttl,
            key_policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self, endpoint: &str) -> String {
        cache_key(endpoint, self.key_policy)
    }

    /// Fresh cached schema for `endpoint`, if any.
    pub fn load(&self, endpoint: &str, now: SystemTime) -> Option<Schema> {
        match self.try_load(endpoint, now) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "schema cache read skipped");
                None
            }
        }
    }

    fn try_load(&self, endpoint: &str, now: SystemTime) -> Result<Option<Schema>, GqlError> {
        let key = self.key(endpoint);
        let modified = match self.store.modified(&key) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GqlError::Cache(e.to_string())),
        };
        if !is_fresh(modified, now, self.ttl) {
            tracing::debug!(endpoint, key = %key, "schema cache entry is stale");
            return Ok(None);
        }
        let bytes = self
            .store
            .read(&key)
            .map_err(|e| GqlError::Cache(e.to_string()))?;
        let schema = serde_json::from_slice(&bytes).map_err(|e| GqlError::Cache(e.to_string()))?;
        Ok(Some(schema))
    }

    /// Writes `schema` for `endpoint`; failures are logged and dropped.
    pub fn save(&self, endpoint: &str, schema: &Schema) {
        let key = self.key(endpoint);
        let result = serde_json::to_vec(schema)
            .map_err(|e| GqlError::Cache(e.to_string()))
            .and_then(|bytes| {
                self.store
                    .write(&key, &bytes)
                    .map_err(|e| GqlError::Cache(e.to_string()))
            });
        if let Err(e) = result {
            tracing::debug!(endpoint, key = %key, error = %e, "schema cache write skipped");
        }
    }

    /// Cached schema when fresh and not bypassed, otherwise `fetch` and write
    /// the result back. Only `fetch` errors propagate.
    pub fn load_or_fetch<F>(&self, endpoint: &str, bypass: bool, fetch: F) -> Result<Schema, GqlError>
    where
        F: FnOnce() -> Result<Schema, GqlError>,
    {
        if !bypass && let Some(schema) = self.load(endpoint, SystemTime::now()) {
            tracing::debug!(endpoint, "using cached schema");
            return Ok(schema);
        }
        let schema = fetch()?;
        self.save(endpoint, &schema);
        Ok(schema)
    }
}

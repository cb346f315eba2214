//! Live sources consulted by the environment store.
//!
//! Responsibilities:
//! - Provide `Table`, the shared key/value map used for the host-owned
//!   committed and context sources.
//! - Provide process-environment reads with empty/whitespace filtering and
//!   the single `unsafe` process-environment write.
//! - Merge source snapshots into a cache with the canonical precedence order.
//!
//! Does NOT handle:
//! - Caching or backfill (see `stash.rs`).
//! - `.env` file parsing (see `stash.rs`).
//!
//! Invariants:
//! - Empty or whitespace-only process-environment values are treated as
//!   unset, and returned values are trimmed.
//! - `merged` applies later sources over earlier ones: committed, then
//!   context, then process environment.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Optional secondary lookup consulted before raw source reads on a cache
/// miss.
pub type Resolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A shared key/value table owned by the host process.
///
/// Cloning a `Table` yields another handle on the same map, so the host can
/// keep a handle and mutate the source directly while a store reads through
/// it.
#[derive(Clone, Default)]
pub struct Table {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Insert a key, replacing any existing value.
    pub fn insert(&self, key: &str, value: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    /// Insert a key only if it is not already present. Returns whether the
    /// value was inserted.
    pub fn insert_if_absent(&self, key: String, value: String) -> bool {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        true
    }

    /// Whether the table holds a key.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Copy the current contents.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Read a process-environment variable, returning None if unset, empty, or
/// whitespace-only. Returns the trimmed value (leading/trailing whitespace
/// removed) if present.
pub(crate) fn process_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Snapshot the process environment, skipping unset-equivalent values.
pub(crate) fn process_snapshot() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| {
            let trimmed = v.trim();
            if trimmed.len() == v.len() {
                (k, v)
            } else {
                (k, trimmed.to_string())
            }
        })
        .collect()
}

/// Write a single process-environment variable.
pub(crate) fn set_process_var(key: &str, value: &str) {
    // SAFETY: callers must ensure no other thread reads or writes the process
    // environment concurrently. The store serializes its own writers; hosts
    // embedding the store in a multi-threaded process own that guarantee.
    unsafe { std::env::set_var(key, value) };
}

/// Merge source snapshots into one flat map.
///
/// Later sources overwrite earlier ones for duplicate keys: committed, then
/// context, then process environment. Operators can therefore override any
/// file-provided default by exporting a real environment variable.
pub(crate) fn merged(
    committed: HashMap<String, String>,
    context: HashMap<String, String>,
    process: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut cache = committed;
    cache.extend(context);
    cache.extend(process);
    cache
}

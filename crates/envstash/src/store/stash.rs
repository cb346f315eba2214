//! Core environment store implementation.
//!
//! Responsibilities:
//! - Parse the env file into the committed live source via `dotenvy`.
//! - Build and maintain the flat cache over all live sources.
//! - Serve read-through `get` with backfill and write-through `set`.
//!
//! Does NOT handle:
//! - Construction options (see `builder.rs`).
//! - Raw source access primitives (see `sources.rs`).
//!
//! Invariants / Assumptions:
//! - The cache and load state are guarded by one mutex; backfill-on-read is a
//!   write and must hold it.
//! - The resolver is called with the state lock held and must not call back
//!   into the same store.
//! - Dotenv diagnostics carry the parser's byte position, never line
//!   contents, so `.env` secrets cannot leak through logs.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{debug, trace, warn};

use super::builder::{AllowedValues, EnvStashBuilder};
use super::error::EnvError;
use super::sources::{self, Resolver, Table};
use crate::constants::DOTENV_DISABLED_VAR;

/// Cache and load state, guarded together.
struct CacheState {
    cache: Option<HashMap<String, String>>,
    loaded: bool,
}

/// Layered environment store.
///
/// Holds a flat cache derived from the live sources plus handles on the
/// host-owned committed and context tables. See the module docs for the
/// merge and lookup orders.
pub struct EnvStash {
    file_name: String,
    committed: Table,
    context: Table,
    resolver: Option<Resolver>,
    required: Vec<String>,
    allowed: Vec<AllowedValues>,
    state: Mutex<CacheState>,
}

impl Default for EnvStash {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvStash {
    /// Create a store with default settings: `.env` file name, fresh live
    /// tables, no resolver, no constraints.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a store.
    pub fn builder() -> EnvStashBuilder {
        EnvStashBuilder::new()
    }

    /// Process-wide convenience instance with default settings.
    ///
    /// Hosts that want injected tables, a resolver, or constraints should
    /// construct their own store via [`EnvStash::builder`] and pass it
    /// around explicitly.
    pub fn global() -> &'static EnvStash {
        static GLOBAL: OnceLock<EnvStash> = OnceLock::new();
        GLOBAL.get_or_init(EnvStash::new)
    }

    pub(crate) fn from_parts(
        file_name: String,
        committed: Table,
        context: Table,
        resolver: Option<Resolver>,
        required: Vec<String>,
        allowed: Vec<AllowedValues>,
    ) -> Self {
        Self {
            file_name,
            committed,
            context,
            resolver,
            required,
            allowed,
            state: Mutex::new(CacheState {
                cache: None,
                loaded: false,
            }),
        }
    }

    /// Handle on the committed live source (the target of `.env` parsing).
    pub fn committed(&self) -> Table {
        self.committed.clone()
    }

    /// Handle on the context live source.
    pub fn context(&self) -> Table {
        self.context.clone()
    }

    /// Whether `load` has already run.
    pub fn is_loaded(&self) -> bool {
        self.lock_state().loaded
    }

    /// Load the env file from `dir` and build the cache.
    ///
    /// Missing, unreadable, or malformed files are logged and ignored; the
    /// live sources keep whatever they held before the call. Idempotent: a
    /// second call while loaded re-parses nothing and preserves values set
    /// via [`EnvStash::set`] in the interim. Values already cached by earlier
    /// lookups or `set` calls keep precedence over file-provided ones.
    ///
    /// # Errors
    ///
    /// Returns an error only when a `require` or `allow_values` constraint
    /// is violated after the merge. A misconfigured deployment must not
    /// proceed, so callers are expected to treat this as fatal at startup.
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<(), EnvError> {
        let mut state = self.lock_state();
        if state.loaded {
            return Ok(());
        }

        if Self::dotenv_disabled() {
            debug!("{} is set, skipping env file parsing", DOTENV_DISABLED_VAR);
        } else {
            self.parse_env_file(dir.as_ref());
        }
        state.loaded = true;

        // A lookup or set before load may have built the cache already; fold
        // it over a fresh merge so file values surface while backfills and
        // interim sets keep precedence. Validation always sees the
        // post-parse merge.
        let mut merged = self.merge_live_sources();
        if let Some(existing) = state.cache.take() {
            merged.extend(existing);
        }
        let result = self.validate(&merged);
        state.cache = Some(merged);
        result
    }

    /// Look up a variable, falling back through the live sources.
    ///
    /// Cache hits return immediately. On a miss the resolver, process
    /// environment, context table, and committed table are consulted in that
    /// order; the first value found is backfilled into the cache. Absence is
    /// not memoized, so a variable defined later in the process lifetime is
    /// still picked up.
    pub fn lookup(&self, name: &str) -> Option<String> {
        let mut state = self.lock_state();
        let cache = state
            .cache
            .get_or_insert_with(|| self.merge_live_sources());

        if let Some(value) = cache.get(name) {
            return Some(value.clone());
        }

        let found = self
            .resolver
            .as_ref()
            .and_then(|resolve| resolve(name))
            .or_else(|| sources::process_var(name))
            .or_else(|| self.context.get(name))
            .or_else(|| self.committed.get(name));

        if let Some(value) = &found {
            trace!(name, "backfilling cache from live source");
            cache.insert(name.to_string(), value.clone());
        }
        found
    }

    /// Look up a variable, returning `default` when absent from every
    /// source. The default is never cached.
    pub fn get(&self, name: &str, default: &str) -> String {
        self.lookup(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Write a value through to the cache and every live source.
    ///
    /// After this call any reader sees the value, whether it goes through
    /// the cache, the committed or context table, or the raw process
    /// environment. Leading and trailing whitespace is trimmed on write,
    /// matching the process-environment read contract, so the surfaced
    /// value is identical before and after a cache rebuild.
    pub fn set(&self, name: &str, value: &str) {
        let value = value.trim();
        let mut state = self.lock_state();
        let cache = state
            .cache
            .get_or_insert_with(|| self.merge_live_sources());
        cache.insert(name.to_string(), value.to_string());
        drop(state);

        self.committed.insert(name, value);
        self.context.insert(name, value);
        sources::set_process_var(name, value);
    }

    /// Reset the cache and load state, forcing the next `load` or lookup to
    /// rebuild from the current live sources. The live sources themselves
    /// are owned externally and are not touched. Used for test isolation.
    pub fn clear_cache(&self) {
        let mut state = self.lock_state();
        state.cache = None;
        state.loaded = false;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Parse `<dir>/<file_name>` into the committed table.
    ///
    /// Keys already present in the committed table are preserved, so values
    /// written via `set` before `load` survive parsing. Every failure mode
    /// is a logged no-op.
    fn parse_env_file(&self, dir: &Path) {
        let path = dir.join(&self.file_name);
        let entries = match dotenvy::from_path_iter(&path) {
            Ok(entries) => entries,
            Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no env file found");
                return;
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to open env file, skipping");
                return;
            }
        };

        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    self.committed.insert_if_absent(key, value);
                }
                Err(dotenvy::Error::LineParse(_, position)) => {
                    // Position only: line contents may hold secrets.
                    warn!(path = %path.display(), position, "skipping malformed env file line");
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "aborting env file parse");
                    break;
                }
            }
        }
        debug!(path = %path.display(), "env file parsed into committed source");
    }

    fn merge_live_sources(&self) -> HashMap<String, String> {
        debug!("building environment cache from live sources");
        sources::merged(
            self.committed.snapshot(),
            self.context.snapshot(),
            sources::process_snapshot(),
        )
    }

    /// Check `require` and `allow_values` constraints against the merged
    /// view.
    fn validate(&self, cache: &HashMap<String, String>) -> Result<(), EnvError> {
        for var in &self.required {
            match cache.get(var) {
                Some(value) if !value.trim().is_empty() => {}
                _ => return Err(EnvError::MissingVar(var.clone())),
            }
        }
        for constraint in &self.allowed {
            if let Some(value) = cache.get(&constraint.var)
                && !constraint.values.iter().any(|allowed| allowed == value)
            {
                return Err(EnvError::InvalidValue {
                    var: constraint.var.clone(),
                    message: format!(
                        "must be one of [{}], got '{}'",
                        constraint.values.join(", "),
                        value
                    ),
                });
            }
        }
        Ok(())
    }
}

//! Layered environment store.
//!
//! Responsibilities:
//! - Load variables from a `.env` file into the committed live source.
//! - Merge all live sources into a flat cache with a fixed precedence order.
//! - Provide read-through `get` with backfill and write-through `set`.
//! - Enforce the `DOTENV_DISABLED` gate to prevent accidental dotenv loading
//!   in tests.
//!
//! Does NOT handle:
//! - Parsing the `.env` format itself (delegated to `dotenvy`).
//! - Persisting values beyond the current process lifetime.
//! - Watching files for changes.
//!
//! Invariants / Assumptions:
//! - Merge order is committed, then context, then process environment, so the
//!   process environment wins every conflict.
//! - Lookup order on a cache miss is resolver, process environment, context
//!   table, committed table; the first hit is backfilled into the cache.
//! - Absence is never memoized: a defaulted `get` leaves the cache untouched.
//! - `load` is idempotent and never fails on a missing or malformed file.
//! - `clear_cache` erases the cache and load state only, never live sources.

mod builder;
mod error;
mod sources;
mod stash;

pub use builder::EnvStashBuilder;
pub use error::EnvError;
pub use sources::{Resolver, Table};
pub use stash::EnvStash;

#[cfg(test)]
mod tests;

//! Tests for write-through `set`.
//!
//! Responsibilities:
//! - Test that `set` makes the value visible through the cache and through
//!   every live source.
//! - Test that a fresh store observes values written by another store.

use serial_test::serial;

use super::{cleanup_env, env_lock};
use crate::{EnvStash, Table};

#[test]
#[serial]
fn test_set_writes_through_all_sources() {
    let _lock = env_lock().lock().unwrap();
    let committed = Table::new();
    let context = Table::new();

    let stash = EnvStash::builder()
        .with_committed_table(committed.clone())
        .with_context_table(context.clone())
        .build();
    stash.set("STASH_TEST_WT", "v");

    assert_eq!(stash.get("STASH_TEST_WT", ""), "v");
    assert_eq!(committed.get("STASH_TEST_WT").as_deref(), Some("v"));
    assert_eq!(context.get("STASH_TEST_WT").as_deref(), Some("v"));
    assert_eq!(
        std::env::var("STASH_TEST_WT").as_deref(),
        Ok("v"),
        "set must propagate into the process environment"
    );

    cleanup_env(&["STASH_TEST_WT"]);
}

#[test]
#[serial]
fn test_fresh_store_observes_set_value() {
    let _lock = env_lock().lock().unwrap();

    let writer = EnvStash::new();
    writer.set("STASH_TEST_FRESH", "shared");

    // A fresh instance shares no tables with the writer; it can only see the
    // value through the process environment.
    let reader = EnvStash::new();
    assert_eq!(reader.get("STASH_TEST_FRESH", ""), "shared");

    cleanup_env(&["STASH_TEST_FRESH"]);
}

#[test]
#[serial]
fn test_set_trims_whitespace_consistently() {
    let _lock = env_lock().lock().unwrap();

    let stash = EnvStash::new();
    stash.set("STASH_TEST_TRIM", "  padded  ");
    assert_eq!(stash.get("STASH_TEST_TRIM", ""), "padded");

    // The surfaced value must not change across a cache rebuild.
    stash.clear_cache();
    assert_eq!(stash.get("STASH_TEST_TRIM", ""), "padded");
    assert_eq!(
        stash.committed().get("STASH_TEST_TRIM").as_deref(),
        Some("padded")
    );

    cleanup_env(&["STASH_TEST_TRIM"]);
}

#[test]
#[serial]
fn test_global_instance_writes_through() {
    let _lock = env_lock().lock().unwrap();

    EnvStash::global().set("STASH_TEST_GLOBAL", "g");

    assert_eq!(EnvStash::global().get("STASH_TEST_GLOBAL", ""), "g");
    assert_eq!(std::env::var("STASH_TEST_GLOBAL").as_deref(), Ok("g"));

    cleanup_env(&["STASH_TEST_GLOBAL"]);
}

#[test]
#[serial]
fn test_set_survives_clear_cache() {
    let _lock = env_lock().lock().unwrap();

    let stash = EnvStash::new();
    stash.set("STASH_TEST_SET_CLEAR", "v");
    stash.clear_cache();

    assert_eq!(
        stash.get("STASH_TEST_SET_CLEAR", ""),
        "v",
        "Rebuilt cache must re-derive the value from the live sources"
    );

    cleanup_env(&["STASH_TEST_SET_CLEAR"]);
}

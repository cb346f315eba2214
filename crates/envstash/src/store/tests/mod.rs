//! Tests for the layered environment store.
//!
//! Responsibilities:
//! - Test env file loading, merge precedence, fallback lookup, write-through
//!   `set`, cache clearing, and load-time validation.
//!
//! Invariants / Assumptions:
//! - Tests touching the process environment (building a cache snapshots it)
//!   hold `env_lock()` and use unique `STASH_TEST_*` variable names to
//!   prevent cross-test contamination.
//! - Temporary env file directories are cleaned up automatically via
//!   `tempfile`.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub mod set_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Write a `.env` file with the given contents into `dir`.
pub fn write_env_file(dir: &Path, contents: &str) {
    fs::write(dir.join(".env"), contents).unwrap();
}

/// Helper to clear the DOTENV_DISABLED variable.
pub fn enable_dotenv() {
    // SAFETY: callers hold env_lock(), no concurrent env access
    unsafe { std::env::remove_var("DOTENV_DISABLED") };
}

/// Helper to set a process environment variable.
pub fn set_env(key: &str, value: &str) {
    // SAFETY: callers hold env_lock(), no concurrent env access
    unsafe { std::env::set_var(key, value) };
}

/// Helper to remove process environment variables.
pub fn cleanup_env(vars: &[&str]) {
    for var in vars {
        // SAFETY: callers hold env_lock(), no concurrent env access
        unsafe { std::env::remove_var(var) };
    }
}

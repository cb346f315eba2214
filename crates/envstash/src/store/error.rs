//! Error types for the environment store.
//!
//! Responsibilities:
//! - Define error variants for constraint validation failures at load time.
//!
//! Does NOT handle:
//! - Dotenv file problems: a missing or malformed `.env` file is a logged
//!   no-op, not an error (see `stash.rs`).
//!
//! Invariants:
//! - Error messages never include raw `.env` line contents.

use thiserror::Error;

/// Errors that can occur while loading the environment store.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

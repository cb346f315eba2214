//! Centralized constants for the envstash workspace.
//!
//! This module contains default values used across the crate to avoid
//! magic string duplication and improve maintainability.

/// Default file name parsed by [`EnvStash::load`](crate::EnvStash::load).
pub const DEFAULT_ENV_FILE_NAME: &str = ".env";

/// Environment variable that disables `.env` file parsing entirely when set
/// to `1` or `true`. Used to keep test runs independent of developer `.env`
/// files.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

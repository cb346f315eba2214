//! Builder for the environment store.
//!
//! Responsibilities:
//! - Configure the env file name, injected live-source tables, the optional
//!   resolver, and load-time validation constraints.
//!
//! Does NOT handle:
//! - Loading or lookup logic (see `stash.rs`).
//!
//! Invariants:
//! - Constraints are checked once, at `load` time, against the merged view.
//! - An allowed-values constraint binds only when the variable is present;
//!   combine with `require` to also demand presence.

use std::sync::Arc;

use super::sources::{Resolver, Table};
use super::stash::EnvStash;
use crate::constants::DEFAULT_ENV_FILE_NAME;

/// Constraint restricting a variable to an enumerated set of values.
pub(crate) struct AllowedValues {
    pub(crate) var: String,
    pub(crate) values: Vec<String>,
}

/// Builder for [`EnvStash`].
pub struct EnvStashBuilder {
    file_name: String,
    committed: Option<Table>,
    context: Option<Table>,
    resolver: Option<Resolver>,
    required: Vec<String>,
    allowed: Vec<AllowedValues>,
}

impl Default for EnvStashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvStashBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            file_name: DEFAULT_ENV_FILE_NAME.to_string(),
            committed: None,
            context: None,
            resolver: None,
            required: Vec::new(),
            allowed: Vec::new(),
        }
    }

    /// Override the env file name parsed by `load` (primarily for testing).
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Use a host-owned committed table instead of a fresh one.
    pub fn with_committed_table(mut self, table: Table) -> Self {
        self.committed = Some(table);
        self
    }

    /// Use a host-owned context table instead of a fresh one.
    pub fn with_context_table(mut self, table: Table) -> Self {
        self.context = Some(table);
        self
    }

    /// Install a secondary lookup consulted before raw source reads on a
    /// cache miss.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Require a variable to be present and non-empty after `load`.
    pub fn require(mut self, var: impl Into<String>) -> Self {
        self.required.push(var.into());
        self
    }

    /// Restrict a variable to an enumerated set of values, checked at `load`
    /// when the variable is present.
    pub fn allow_values<I, S>(mut self, var: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.push(AllowedValues {
            var: var.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Build the store.
    pub fn build(self) -> EnvStash {
        EnvStash::from_parts(
            self.file_name,
            self.committed.unwrap_or_default(),
            self.context.unwrap_or_default(),
            self.resolver,
            self.required,
            self.allowed,
        )
    }
}

//! Process-environment store with layered lookup.
//!
//! This crate loads variables from a `.env` file into a host-owned table,
//! merges every live source into a flat cache, and exposes read-through
//! `get` / write-through `set` over the cache, an optional resolver, the
//! process environment, and host-owned committed/context tables.

pub mod constants;
mod store;

pub use store::{EnvError, EnvStash, EnvStashBuilder, Resolver, Table};

//! Core types and algorithms for the boardroom registry.
//!
//! Reconciles boardroom-change announcements and a historical director
//! dataset into one registry of identities. This crate is free of database
//! and I/O dependencies; storage is reached through [`store::RegistryStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod change;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod matcher;
pub mod merger;
pub mod name;
pub mod parse;
pub mod reconcile;
pub mod store;

pub use error::{Error, Result};

#[cfg(test)]
mod memory;

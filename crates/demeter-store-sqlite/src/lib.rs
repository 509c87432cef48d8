//! SQLite backend for the Demeter recipe store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every top-level operation runs in one
//! [`rusqlite::Transaction`]; the composition walks in [`graph`] take that
//! transaction by reference so nested steps can never open their own.

mod encode;
mod graph;
mod recipe;
mod schema;
mod store;
mod temporal;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

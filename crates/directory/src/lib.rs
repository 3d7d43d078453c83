//! `portal-directory`: account record storage.
//!
//! The directory exclusively owns account records. Everything above it
//! consumes the [`AccountDirectory`] trait; two implementations exist:
//! Postgres-backed for production and in-memory for tests and local dev.

pub mod contract;
pub mod memory;
pub mod postgres;

pub use contract::{AccountDirectory, AccountPatch, DirectoryError, NewAccount};
pub use memory::InMemoryDirectory;
pub use postgres::PostgresDirectory;

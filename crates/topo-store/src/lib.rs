//! Topo Store - SQLite persistence for set instances
//!
//! Provides:
//! - Connection management and embedded, checksummed migrations
//! - `SqliteStore`, the SQLite implementation of the schema resolver and
//!   instance backend, with the sibling name rule held by a unique index

pub mod db;
pub mod errors;
pub mod migrations;
pub mod sqlite_store;

pub use errors::Result;
pub use sqlite_store::SqliteStore;

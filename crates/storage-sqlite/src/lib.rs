//! SQLite storage implementation for Quotebook.
//!
//! This crate provides the durable [`KeyValueStore`] using Diesel ORM with
//! SQLite. It contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor that serializes every write
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! All other crates (`core`, `connect`) are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)          connect (remote)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! [`KeyValueStore`]: quotebook_core::storage::KeyValueStore

pub mod db;
pub mod errors;
pub mod kv;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use kv::SqliteKeyValueStore;

// Re-export from quotebook-core for convenience
pub use quotebook_core::errors::{DatabaseError, Error, Result};

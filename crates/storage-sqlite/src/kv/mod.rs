//! Durable key-value storage backed by the `kv_store` table.

mod model;
mod repository;

pub use model::KvEntryDB;
pub use repository::SqliteKeyValueStore;

//! Storage traits for string-keyed persistence.

use async_trait::async_trait;

use crate::errors::Result;

/// String-keyed store used for snapshots, filter state and session pointers.
///
/// Reads are synchronous; writes are async so that backends can route them
/// through a single writer.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a single key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Insert or overwrite several keys at once.
    ///
    /// Either every entry is written or none is.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

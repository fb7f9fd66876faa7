//! Service trait for the quote store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ImportSummary, LoadSource, NewQuote, Quote};
use crate::errors::Result;
use crate::sync::{MergeOutcome, MergePolicy};

/// Ordered quote collection backed by a durable snapshot.
///
/// Reads are served from memory. Every mutation is persisted before it
/// becomes visible, so a failed write leaves the previous state in place.
#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// All quotes in insertion order.
    fn get_quotes(&self) -> Vec<Quote>;

    /// Look up a quote by id. The first match wins if ids are duplicated.
    fn get_quote(&self, id: i64) -> Result<Quote>;

    /// Quotes in `category`, or all quotes for the `"all"` sentinel.
    fn filtered(&self, category: &str) -> Vec<Quote>;

    /// Distinct trimmed, non-empty categories in lexicographic order.
    fn all_categories(&self) -> Vec<String>;

    /// How the store was populated when it was loaded.
    fn load_source(&self) -> LoadSource;

    /// When the snapshot was last written, if ever.
    fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>>;

    /// Validate, assign the next id, append and persist.
    async fn add_quote(&self, new_quote: NewQuote) -> Result<Quote>;

    /// Replace the whole collection with `quotes` and persist it.
    async fn save_quotes(&self, quotes: Vec<Quote>) -> Result<()>;

    /// Append the valid quotes from a JSON import payload and persist.
    async fn import_quotes(&self, raw: &str) -> Result<ImportSummary>;

    /// Serialize the collection as indented JSON.
    fn export_quotes(&self) -> Result<String>;

    /// Merge `remote` into the collection under the store's write lock and
    /// persist the result as one write.
    async fn apply_merge(
        &self,
        remote: Vec<Quote>,
        policy: &dyn MergePolicy,
    ) -> Result<MergeOutcome>;
}

//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::sync::SyncReport;

/// Why the quote collection changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotesChangeReason {
    Added,
    Imported,
    Synced,
}

/// Domain events emitted by core services after successful mutations.
///
/// Runtime adapters translate them into platform-specific actions (status
/// lines, push notifications, log records).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Quotes were added, imported or replaced by a sync.
    QuotesChanged {
        reason: QuotesChangeReason,
        quote_ids: Vec<i64>,
    },

    /// The selected category filter changed.
    FilterChanged { category: String },

    /// A sync run started.
    SyncStarted,

    /// A sync run finished successfully.
    SyncCompleted { report: SyncReport },

    /// A sync run failed; local data is unchanged.
    SyncFailed { message: String },
}

impl DomainEvent {
    /// Creates a QuotesChanged event.
    pub fn quotes_changed(reason: QuotesChangeReason, quote_ids: Vec<i64>) -> Self {
        Self::QuotesChanged { reason, quote_ids }
    }

    /// Creates a FilterChanged event.
    pub fn filter_changed(category: impl Into<String>) -> Self {
        Self::FilterChanged {
            category: category.into(),
        }
    }

    /// Creates a SyncCompleted event.
    pub fn sync_completed(report: SyncReport) -> Self {
        Self::SyncCompleted { report }
    }
}

//! Quote domain models.

use serde::{Deserialize, Serialize};

/// A stored quote: text, category and a store-unique identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(id: i64, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
        }
    }
}

/// Input model for adding a quote by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub text: String,
    pub category: String,
}

impl NewQuote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

/// Result of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Records appended to the store.
    pub imported: usize,
    /// Array elements dropped because they were not valid quotes.
    pub skipped: usize,
}

/// How the store was populated at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The durable snapshot was read successfully.
    Snapshot,
    /// No snapshot existed yet.
    FirstRun,
    /// The snapshot could not be decoded and was replaced.
    RecoveredFromCorruption,
}

/// Largest id in `quotes`, or 0 for an empty slice.
pub fn max_quote_id(quotes: &[Quote]) -> i64 {
    quotes.iter().map(|q| q.id).max().unwrap_or(0).max(0)
}

/// Built-in quotes used on first run and after a corrupt snapshot.
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            1,
            "The only way to do great work is to love what you do.",
            "Inspiration",
        ),
        Quote::new(
            2,
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        Quote::new(
            3,
            "The future belongs to those who believe in the beauty of their dreams.",
            "Dreams",
        ),
        Quote::new(
            4,
            "In the end, we will remember not the words of our enemies, but the silence of our friends.",
            "Friendship",
        ),
        Quote::new(
            5,
            "The only impossible journey is the one you never begin.",
            "Motivation",
        ),
    ]
}

/// Decode a serialized snapshot.
pub fn decode_snapshot(raw: &str) -> Result<Vec<Quote>, super::SnapshotError> {
    serde_json::from_str(raw).map_err(|e| super::SnapshotError(e.to_string()))
}

/// Encode a snapshot in the compact form stored under the `quotes` key.
pub fn encode_snapshot(quotes: &[Quote]) -> Result<String, serde_json::Error> {
    serde_json::to_string(quotes)
}

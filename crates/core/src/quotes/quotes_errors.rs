use thiserror::Error;

/// Errors raised by quote store operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Quote {0} not found")]
    NotFound(i64),

    #[error("No quotes to export")]
    NothingToExport,

    #[error("Failed to serialize quotes: {0}")]
    Serialization(String),
}

/// Errors raised when an import payload is rejected as a whole.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImportError {
    #[error("Imported file is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Imported file must contain an array of quotes")]
    NotAnArray,

    #[error("No valid quotes found in the imported file")]
    NoValidQuotes,

    #[error("No quote id left to assign above {0}")]
    IdsExhausted(i64),
}

/// A durable snapshot that could not be decoded.
///
/// Never surfaced to callers: the store replaces the snapshot with the
/// default set when it sees this.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Stored quote snapshot is malformed: {0}")]
pub struct SnapshotError(pub String);

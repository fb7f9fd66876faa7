//! Quote store: records, durable snapshot, import and export.

pub mod import;
mod quotes_errors;
mod quotes_model;
mod quotes_service;
mod quotes_traits;

#[cfg(test)]
mod quotes_service_tests;

pub use import::{export_json, parse_import, ParsedImport};
pub use quotes_errors::{ImportError, QuoteError, SnapshotError};
pub use quotes_model::*;
pub use quotes_service::QuoteService;
pub use quotes_traits::QuoteServiceTrait;

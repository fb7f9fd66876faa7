//! Quotebook Connect - fetches the remote record set for sync.
//!
//! This crate owns the HTTP side of syncing: it requests the remote payload,
//! maps it into quotes and hands them to the core sync engine through
//! [`quotebook_core::sync::RemoteQuoteSource`].

pub mod client;
pub mod error;
pub mod mapping;
pub mod types;

pub use client::{RemoteQuoteClient, DEFAULT_REMOTE_URL, DEFAULT_TIMEOUT};
pub use error::{ConnectError, Result};
pub use mapping::{map_payload, QuoteMapping};
pub use types::{RemoteCompany, RemoteQuote, RemoteUser};

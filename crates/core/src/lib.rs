//! Quotebook Core - quote store, session view state and sync engine.
//!
//! This crate contains the domain logic. It is storage- and
//! transport-agnostic: persistence goes through [`storage::KeyValueStore`]
//! (implemented by `storage-sqlite`) and the remote record set through
//! [`sync::RemoteQuoteSource`] (implemented by `connect`).

pub mod constants;
pub mod errors;
pub mod events;
pub mod quotes;
pub mod session;
pub mod storage;
pub mod sync;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

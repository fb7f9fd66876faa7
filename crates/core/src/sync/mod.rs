//! Remote sync: merge policies, the sync engine and its models.

mod merge;
mod sync_model;
mod sync_service;
mod sync_traits;

pub use merge::*;
pub use sync_model::*;
pub use sync_service::SyncService;
pub use sync_traits::{RemoteQuoteSource, SyncServiceTrait};

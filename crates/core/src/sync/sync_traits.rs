use async_trait::async_trait;

use super::{SyncReport, SyncState};
use crate::errors::Result;
use crate::quotes::Quote;

/// Source of the remote record set.
///
/// Implementations map whatever the remote returns into quotes with stable
/// ids. Any failure must be reported as an error; partial results are not
/// allowed.
#[async_trait]
pub trait RemoteQuoteSource: Send + Sync {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>>;
}

/// Reconciles the local quote store with the remote record set.
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Fetch, merge and persist once.
    ///
    /// Fails with `SyncError::AlreadyInProgress` when another run is active
    /// and with `SyncError::FetchFailed` when the remote is unavailable; in
    /// both cases the local store is left untouched.
    async fn sync_once(&self) -> Result<SyncReport>;

    /// Current engine status.
    fn state(&self) -> SyncState;

    /// Whether a run is currently active.
    fn is_running(&self) -> bool;

    /// Name of the configured merge policy.
    fn policy_name(&self) -> &'static str;
}

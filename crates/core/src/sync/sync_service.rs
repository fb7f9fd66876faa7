use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};

use super::{
    MergePolicy, RemoteQuoteSource, SyncError, SyncReport, SyncServiceTrait, SyncState, SyncStatus,
};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::quotes::QuoteServiceTrait;

/// Clears the in-progress flag when a run ends, however it ends. A run
/// dropped before it reported is recorded as failed.
struct RunGuard<'a> {
    running: &'a AtomicBool,
    state: &'a RwLock<SyncState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.status == SyncStatus::Running {
            warn!("Quote sync was cancelled before it finished");
            state.fail_sync("Sync was cancelled before it finished".to_string());
        }
        drop(state);
        self.running.store(false, Ordering::Release);
    }
}

/// Orchestrates fetch -> merge -> persist -> report.
///
/// Overlapping calls are rejected rather than queued: the scheduler will run
/// again on its next tick and a manual trigger can simply be retried.
pub struct SyncService {
    quote_service: Arc<dyn QuoteServiceTrait>,
    remote: Arc<dyn RemoteQuoteSource>,
    policy: Arc<dyn MergePolicy>,
    event_sink: Arc<dyn DomainEventSink>,
    running: AtomicBool,
    state: RwLock<SyncState>,
}

impl SyncService {
    pub fn new(
        quote_service: Arc<dyn QuoteServiceTrait>,
        remote: Arc<dyn RemoteQuoteSource>,
        policy: Arc<dyn MergePolicy>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            quote_service,
            remote,
            policy,
            event_sink,
            running: AtomicBool::new(false),
            state: RwLock::new(SyncState::default()),
        }
    }

    fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                running: &self.running,
                state: &self.state,
            })
    }

    fn update_state(&self, f: impl FnOnce(&mut SyncState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }

    async fn run(&self) -> Result<SyncReport> {
        let started_at = Utc::now();

        let remote = self.remote.fetch_quotes().await.map_err(|e| match e {
            Error::Sync(inner) => Error::Sync(inner),
            other => Error::Sync(SyncError::FetchFailed(other.to_string())),
        })?;
        debug!("Fetched {} remote quotes", remote.len());

        let outcome = self
            .quote_service
            .apply_merge(remote, self.policy.as_ref())
            .await?;

        if outcome.duplicate_remote > 0 {
            warn!(
                "Ignored {} remote quotes with repeated ids",
                outcome.duplicate_remote
            );
        }

        Ok(SyncReport::from_merge(
            &outcome,
            self.policy.name(),
            started_at,
            Utc::now(),
        ))
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn sync_once(&self) -> Result<SyncReport> {
        let Some(_guard) = self.try_begin() else {
            debug!("Sync requested while another run is active");
            return Err(SyncError::AlreadyInProgress.into());
        };

        info!("Syncing quotes with remote ({})", self.policy.name());
        self.update_state(|s| s.start_sync(Utc::now()));
        self.event_sink.emit(DomainEvent::SyncStarted);

        match self.run().await {
            Ok(report) => {
                info!("{}", report.message);
                self.update_state(|s| s.complete_sync(report.clone()));
                self.event_sink.emit(DomainEvent::sync_completed(report.clone()));
                Ok(report)
            }
            Err(e) => {
                warn!("Quote sync failed: {}", e);
                let message = e.to_string();
                self.update_state(|s| s.fail_sync(message.clone()));
                self.event_sink.emit(DomainEvent::SyncFailed { message });
                Err(e)
            }
        }
    }

    fn state(&self) -> SyncState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

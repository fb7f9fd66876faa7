//! Sync engine domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MergeOutcome;

/// Errors surfaced by a sync run. Local state is unchanged when these occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The remote record set could not be fetched or decoded.
    #[error("Failed to fetch remote quotes: {0}")]
    FetchFailed(String),

    /// Another sync run has not finished yet.
    #[error("A sync is already in progress")]
    AlreadyInProgress,
}

/// Status of the sync engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// No sync in progress
    #[default]
    Idle,
    /// Sync is running
    Running,
    /// The last sync failed
    Failed,
}

/// Whether a successful run changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOutcome {
    NoChanges,
    Updated,
}

/// Outcome of one successful sync run.
///
/// `outcome` counts every conflict, including ones resolved in favour of
/// the local record. `store_changed` says whether the run wrote anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Remote records appended locally
    pub new_records: usize,
    /// Remote records that collided with a differing local record
    pub conflicts_resolved: usize,
    /// Remote records already identical locally
    pub unchanged: usize,
    /// Whether the local collection was rewritten
    pub store_changed: bool,
    /// Name of the merge policy applied
    pub policy: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Human-readable status line
    pub message: String,
}

impl SyncReport {
    pub fn from_merge(
        outcome: &MergeOutcome,
        policy: &str,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let new_records = outcome.new_ids.len();
        let conflicts_resolved = outcome.conflicts.len();
        let sync_outcome = if new_records == 0 && conflicts_resolved == 0 {
            SyncOutcome::NoChanges
        } else {
            SyncOutcome::Updated
        };

        Self {
            outcome: sync_outcome,
            new_records,
            conflicts_resolved,
            unchanged: outcome.unchanged,
            store_changed: outcome.has_changes(),
            policy: policy.to_string(),
            started_at,
            finished_at,
            message: Self::format_message(sync_outcome, new_records, conflicts_resolved),
        }
    }

    fn format_message(outcome: SyncOutcome, new_records: usize, conflicts: usize) -> String {
        match outcome {
            SyncOutcome::NoChanges => "Sync completed - No changes detected".to_string(),
            SyncOutcome::Updated => format!(
                "Synced! {} new quotes added. {} conflicts resolved.",
                new_records, conflicts
            ),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.outcome == SyncOutcome::Updated
    }
}

/// Tracks the engine's status across runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: SyncStatus,
    /// When sync was last attempted
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// When sync last succeeded
    pub last_successful_at: Option<DateTime<Utc>>,
    /// Last error message if failed
    pub last_error: Option<String>,
    /// Report of the last successful run
    pub last_report: Option<SyncReport>,
}

impl SyncState {
    /// Mark sync as started
    pub fn start_sync(&mut self, at: DateTime<Utc>) {
        self.status = SyncStatus::Running;
        self.last_attempted_at = Some(at);
    }

    /// Mark sync as completed successfully
    pub fn complete_sync(&mut self, report: SyncReport) {
        self.status = SyncStatus::Idle;
        self.last_successful_at = Some(report.finished_at);
        self.last_error = None;
        self.last_report = Some(report);
    }

    /// Mark sync as failed
    pub fn fail_sync(&mut self, error: String) {
        self.status = SyncStatus::Failed;
        self.last_error = Some(error);
    }
}

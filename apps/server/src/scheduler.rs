//! Background scheduler for periodic remote sync.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;
use quotebook_core::errors::Error;
use quotebook_core::sync::SyncError;

/// Starts the background sync scheduler.
///
/// The first run happens one full interval after startup. `None` disables
/// scheduling; manual syncs still work.
pub fn start_sync_scheduler(state: Arc<AppState>, every: Option<Duration>) {
    let Some(every) = every else {
        info!("Sync scheduler disabled");
        return;
    };

    tokio::spawn(async move {
        info!("Sync scheduler started ({}s interval)", every.as_secs());

        let mut sync_interval = interval(every);
        sync_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        sync_interval.tick().await;

        loop {
            sync_interval.tick().await;
            run_scheduled_sync(&state).await;
        }
    });
}

/// Runs a single scheduled sync operation.
pub async fn run_scheduled_sync(state: &AppState) {
    debug!("Running scheduled sync...");

    match state.sync_service.sync_once().await {
        Ok(report) => {
            debug!(
                "Scheduled sync finished: {} new, {} conflicts",
                report.new_records, report.conflicts_resolved
            );
        }
        Err(Error::Sync(SyncError::AlreadyInProgress)) => {
            debug!("Scheduled sync skipped: a sync is already running");
        }
        Err(e) => {
            warn!("Scheduled sync failed: {}", e);
        }
    }
}

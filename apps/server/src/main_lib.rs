use std::sync::Arc;

use crate::config::Config;
use quotebook_connect::RemoteQuoteClient;
use quotebook_core::{
    events::{DomainEventSink, LogDomainEventSink},
    quotes::{LoadSource, QuoteService, QuoteServiceTrait},
    session::{SessionService, SessionServiceTrait},
    storage::{InMemoryKeyValueStore, KeyValueStore},
    sync::{RemoteQuoteSource, SyncService, SyncServiceTrait},
};
use quotebook_storage_sqlite::{db, SqliteKeyValueStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub quote_service: Arc<dyn QuoteServiceTrait>,
    pub session_service: Arc<dyn SessionServiceTrait>,
    pub sync_service: Arc<dyn SyncServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("QB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wire the services against SQLite and the configured HTTP remote.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let remote = RemoteQuoteClient::new(
        &config.remote_url,
        config.remote_mapping,
        config.request_timeout,
    )?;
    tracing::info!(
        "Remote quote source: {} ({:?} mapping)",
        remote.url(),
        remote.mapping()
    );
    build_state_with_remote(config, Arc::new(remote)).await
}

/// Wire the services against SQLite and the given remote source.
pub async fn build_state_with_remote(
    config: &Config,
    remote: Arc<dyn RemoteQuoteSource>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let durable: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool, writer));
    // lastQuoteIndex lives for the lifetime of the process only
    let session_store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    let event_sink: Arc<dyn DomainEventSink> = Arc::new(LogDomainEventSink);

    let quote_service = Arc::new(QuoteService::load(durable.clone(), event_sink.clone()).await?);
    match quote_service.load_source() {
        LoadSource::Snapshot => tracing::info!(
            "Loaded {} quotes from storage",
            quote_service.get_quotes().len()
        ),
        LoadSource::FirstRun => tracing::info!("Initialized quote store with default quotes"),
        LoadSource::RecoveredFromCorruption => {
            tracing::warn!("Stored quotes were unreadable and have been reset to defaults")
        }
    }

    let session_service = Arc::new(SessionService::new(
        quote_service.clone(),
        durable,
        session_store,
        event_sink.clone(),
    )?);

    let sync_service = Arc::new(SyncService::new(
        quote_service.clone(),
        remote,
        config.merge_policy.into_policy(),
        event_sink,
    ));
    tracing::info!("Merge policy: {}", sync_service.policy_name());

    Ok(Arc::new(AppState {
        quote_service,
        session_service,
        sync_service,
    }))
}

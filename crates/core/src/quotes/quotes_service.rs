use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::import::{export_json, parse_import};
use super::{
    decode_snapshot, default_quotes, encode_snapshot, max_quote_id, ImportSummary, LoadSource,
    NewQuote, Quote, QuoteError, QuoteServiceTrait,
};
use crate::constants::{ALL_CATEGORIES, LAST_SYNC_KEY, QUOTES_KEY};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink, QuotesChangeReason};
use crate::storage::KeyValueStore;
use crate::sync::{merge_quotes, MergeOutcome, MergePolicy};

pub struct QuoteService {
    store: Arc<dyn KeyValueStore>,
    event_sink: Arc<dyn DomainEventSink>,
    quotes: Arc<RwLock<Vec<Quote>>>,
    // Serializes mutations; held until the in-memory swap has happened.
    write_lock: Arc<Mutex<()>>,
    load_source: LoadSource,
}

impl QuoteService {
    /// Load the collection from the durable store.
    ///
    /// A missing or malformed snapshot is replaced by the default set, which
    /// is written back immediately. Only backend failures are returned.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Result<Self> {
        let (quotes, load_source) = match store.get(QUOTES_KEY)? {
            Some(raw) => match decode_snapshot(&raw) {
                Ok(quotes) => (quotes, LoadSource::Snapshot),
                Err(e) => {
                    warn!("{}. Falling back to the default quotes.", e);
                    (default_quotes(), LoadSource::RecoveredFromCorruption)
                }
            },
            None => {
                info!("No stored quotes found, initializing with defaults");
                (default_quotes(), LoadSource::FirstRun)
            }
        };

        let service = Self {
            store,
            event_sink,
            quotes: Arc::new(RwLock::new(Vec::new())),
            write_lock: Arc::new(Mutex::new(())),
            load_source,
        };

        if load_source == LoadSource::Snapshot {
            service.replace_in_memory(quotes);
        } else {
            persist(service.store.as_ref(), &quotes).await?;
            service.replace_in_memory(quotes);
        }

        debug!(
            "Loaded {} quotes ({:?})",
            service.snapshot().len(),
            service.load_source
        );
        Ok(service)
    }

    fn snapshot(&self) -> Vec<Quote> {
        self.quotes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_in_memory(&self, quotes: Vec<Quote>) {
        *self.quotes.write().unwrap_or_else(PoisonError::into_inner) = quotes;
    }

    async fn lock_writes(&self) -> OwnedMutexGuard<()> {
        self.write_lock.clone().lock_owned().await
    }

    /// Persist `quotes`, swap them in and emit `event` on a detached task.
    ///
    /// The task owns the write guard, so dropping the caller after the write
    /// was queued still ends with memory matching the durable snapshot.
    async fn commit(
        &self,
        guard: OwnedMutexGuard<()>,
        quotes: Vec<Quote>,
        event: Option<DomainEvent>,
    ) -> Result<()> {
        let store = self.store.clone();
        let memory = self.quotes.clone();
        let event_sink = self.event_sink.clone();

        let task = tokio::spawn(async move {
            let _guard = guard;
            persist(store.as_ref(), &quotes).await?;
            *memory.write().unwrap_or_else(PoisonError::into_inner) = quotes;
            if let Some(event) = event {
                event_sink.emit(event);
            }
            Ok::<(), Error>(())
        });

        task.await
            .map_err(|e| Error::Unexpected(format!("Quote store write task failed: {}", e)))?
    }

    fn validate(new_quote: &NewQuote) -> Result<(String, String)> {
        let text = new_quote.text.trim();
        let category = new_quote.category.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingField("text".to_string()).into());
        }
        if category.is_empty() {
            return Err(ValidationError::MissingField("category".to_string()).into());
        }
        Ok((text.to_string(), category.to_string()))
    }
}

/// Write the snapshot and the save timestamp in a single store call.
async fn persist(store: &dyn KeyValueStore, quotes: &[Quote]) -> Result<()> {
    let encoded = encode_snapshot(quotes).map_err(|e| QuoteError::Serialization(e.to_string()))?;
    let entries = [
        (QUOTES_KEY.to_string(), encoded),
        (LAST_SYNC_KEY.to_string(), Utc::now().to_rfc3339()),
    ];
    store.set_many(&entries).await
}

/// Parse the `lastSync` value: RFC 3339, or epoch milliseconds as older
/// snapshots stored it.
fn parse_saved_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
    fn get_quotes(&self) -> Vec<Quote> {
        self.snapshot()
    }

    fn get_quote(&self, id: i64) -> Result<Quote> {
        self.quotes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| QuoteError::NotFound(id).into())
    }

    fn filtered(&self, category: &str) -> Vec<Quote> {
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        if category == ALL_CATEGORIES {
            return quotes.clone();
        }
        quotes
            .iter()
            .filter(|q| q.category == category)
            .cloned()
            .collect()
    }

    fn all_categories(&self) -> Vec<String> {
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        quotes
            .iter()
            .map(|q| q.category.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn load_source(&self) -> LoadSource {
        self.load_source
    }

    fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .store
            .get(LAST_SYNC_KEY)?
            .as_deref()
            .and_then(parse_saved_at))
    }

    async fn add_quote(&self, new_quote: NewQuote) -> Result<Quote> {
        let (text, category) = Self::validate(&new_quote)?;

        let guard = self.lock_writes().await;
        let mut quotes = self.snapshot();
        let id = max_quote_id(&quotes).checked_add(1).ok_or_else(|| {
            ValidationError::InvalidInput("no quote id left above the current maximum".to_string())
        })?;
        let quote = Quote::new(id, text, category);
        quotes.push(quote.clone());

        let event = DomainEvent::quotes_changed(QuotesChangeReason::Added, vec![quote.id]);
        self.commit(guard, quotes, Some(event)).await?;

        info!("Added quote {} in category '{}'", quote.id, quote.category);
        Ok(quote)
    }

    async fn save_quotes(&self, quotes: Vec<Quote>) -> Result<()> {
        let guard = self.lock_writes().await;
        self.commit(guard, quotes, None).await
    }

    async fn import_quotes(&self, raw: &str) -> Result<ImportSummary> {
        let guard = self.lock_writes().await;
        let mut quotes = self.snapshot();
        let parsed = parse_import(raw, max_quote_id(&quotes))?;

        let imported_ids: Vec<i64> = parsed.quotes.iter().map(|q| q.id).collect();
        let summary = ImportSummary {
            imported: parsed.quotes.len(),
            skipped: parsed.skipped,
        };
        quotes.extend(parsed.quotes);

        let event = DomainEvent::quotes_changed(QuotesChangeReason::Imported, imported_ids);
        self.commit(guard, quotes, Some(event)).await?;

        info!(
            "Imported {} quotes ({} skipped)",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    fn export_quotes(&self) -> Result<String> {
        let quotes = self.snapshot();
        if quotes.is_empty() {
            return Err(QuoteError::NothingToExport.into());
        }
        export_json(&quotes).map_err(|e| Error::Quote(QuoteError::Serialization(e.to_string())))
    }

    async fn apply_merge(
        &self,
        remote: Vec<Quote>,
        policy: &dyn MergePolicy,
    ) -> Result<MergeOutcome> {
        let guard = self.lock_writes().await;
        let local = self.snapshot();
        let outcome = merge_quotes(&local, remote, policy);

        if !outcome.has_changes() {
            debug!("Merge produced no changes, skipping write");
            return Ok(outcome);
        }

        let event = DomainEvent::quotes_changed(QuotesChangeReason::Synced, outcome.changed_ids());
        self.commit(guard, outcome.quotes.clone(), Some(event)).await?;
        Ok(outcome)
    }
}

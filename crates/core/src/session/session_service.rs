use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use log::debug;
use rand::Rng;

use super::DisplayedQuote;
use crate::constants::{ALL_CATEGORIES, LAST_FILTER_KEY, LAST_QUOTE_INDEX_KEY};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::quotes::{Quote, QuoteError, QuoteServiceTrait};
use crate::storage::KeyValueStore;

/// View state on top of the quote store: category filter and last-viewed
/// pointer.
#[async_trait]
pub trait SessionServiceTrait: Send + Sync {
    /// The stored filter, as selected.
    fn current_filter(&self) -> String;

    /// The filter actually applied: a category that no longer exists falls
    /// back to `"all"`.
    fn effective_filter(&self) -> String;

    /// Persist a new filter selection. An empty selection means `"all"`.
    async fn set_filter(&self, category: &str) -> Result<()>;

    /// Quotes matching the effective filter.
    fn filtered_view(&self) -> Vec<Quote>;

    /// Index of the last displayed quote in this session.
    fn last_viewed_index(&self) -> Result<Option<usize>>;

    /// Display the quote at `index`, clamped into the filtered view.
    async fn show_at(&self, index: usize) -> Result<Option<DisplayedQuote>>;

    /// Display a random quote from the filtered view.
    async fn show_random(&self) -> Result<Option<DisplayedQuote>>;

    /// Display the last viewed quote when its index is still valid,
    /// otherwise a random one.
    async fn restore_last_viewed(&self) -> Result<Option<DisplayedQuote>>;

    /// Reset the filter to `"all"` and display the quote with `id`.
    async fn show_quote(&self, id: i64) -> Result<DisplayedQuote>;

    /// Reset the filter to `"all"` and display a random quote.
    async fn reset_to_all_and_show_random(&self) -> Result<Option<DisplayedQuote>>;
}

pub struct SessionService {
    quote_service: Arc<dyn QuoteServiceTrait>,
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    event_sink: Arc<dyn DomainEventSink>,
    filter: RwLock<String>,
}

impl SessionService {
    /// Build the session, restoring the persisted filter.
    pub fn new(
        quote_service: Arc<dyn QuoteServiceTrait>,
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Result<Self> {
        let filter = durable
            .get(LAST_FILTER_KEY)?
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());
        debug!("Restored category filter '{}'", filter);

        Ok(Self {
            quote_service,
            durable,
            session,
            event_sink,
            filter: RwLock::new(filter),
        })
    }

    async fn clear_last_viewed(&self) -> Result<()> {
        self.session.remove(LAST_QUOTE_INDEX_KEY).await
    }

    async fn display(&self, mut view: Vec<Quote>, index: usize) -> Result<Option<DisplayedQuote>> {
        if view.is_empty() {
            self.clear_last_viewed().await?;
            return Ok(None);
        }

        let total = view.len();
        let index = index.min(total - 1);
        self.session
            .set(LAST_QUOTE_INDEX_KEY, &index.to_string())
            .await?;

        let quote = view.swap_remove(index);
        Ok(Some(DisplayedQuote {
            index,
            total,
            filter: self.effective_filter(),
            quote,
        }))
    }
}

fn random_index(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}

#[async_trait]
impl SessionServiceTrait for SessionService {
    fn current_filter(&self) -> String {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn effective_filter(&self) -> String {
        let filter = self.current_filter();
        if filter == ALL_CATEGORIES || self.quote_service.all_categories().contains(&filter) {
            filter
        } else {
            ALL_CATEGORIES.to_string()
        }
    }

    async fn set_filter(&self, category: &str) -> Result<()> {
        let category = if category.is_empty() {
            ALL_CATEGORIES
        } else {
            category
        };

        self.durable.set(LAST_FILTER_KEY, category).await?;
        *self.filter.write().unwrap_or_else(PoisonError::into_inner) = category.to_string();

        self.event_sink.emit(DomainEvent::filter_changed(category));
        Ok(())
    }

    fn filtered_view(&self) -> Vec<Quote> {
        self.quote_service.filtered(&self.effective_filter())
    }

    fn last_viewed_index(&self) -> Result<Option<usize>> {
        Ok(self
            .session
            .get(LAST_QUOTE_INDEX_KEY)?
            .and_then(|raw| raw.trim().parse::<usize>().ok()))
    }

    async fn show_at(&self, index: usize) -> Result<Option<DisplayedQuote>> {
        let view = self.filtered_view();
        self.display(view, index).await
    }

    async fn show_random(&self) -> Result<Option<DisplayedQuote>> {
        let view = self.filtered_view();
        if view.is_empty() {
            self.clear_last_viewed().await?;
            return Ok(None);
        }
        let index = random_index(view.len());
        self.display(view, index).await
    }

    async fn restore_last_viewed(&self) -> Result<Option<DisplayedQuote>> {
        let view = self.filtered_view();
        match self.last_viewed_index()? {
            Some(index) if index < view.len() => self.display(view, index).await,
            _ => self.show_random().await,
        }
    }

    async fn show_quote(&self, id: i64) -> Result<DisplayedQuote> {
        self.set_filter(ALL_CATEGORIES).await?;

        let view = self.quote_service.filtered(ALL_CATEGORIES);
        let index = view
            .iter()
            .position(|q| q.id == id)
            .ok_or(QuoteError::NotFound(id))?;

        self.display(view, index)
            .await?
            .ok_or_else(|| QuoteError::NotFound(id).into())
    }

    async fn reset_to_all_and_show_random(&self) -> Result<Option<DisplayedQuote>> {
        self.set_filter(ALL_CATEGORIES).await?;
        self.show_random().await
    }
}

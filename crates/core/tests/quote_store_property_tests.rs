//! Property-based integration tests for the quote store.

use proptest::prelude::*;
use quotebook_core::constants::{ALL_CATEGORIES, QUOTES_KEY};
use quotebook_core::events::NoOpDomainEventSink;
use quotebook_core::quotes::{NewQuote, Quote, QuoteService, QuoteServiceTrait};
use quotebook_core::storage::InMemoryKeyValueStore;
use std::sync::Arc;

// =============================================================================
// Generators
// =============================================================================

/// Generates a stored snapshot; ids may repeat and need not be ordered.
fn arb_snapshot() -> impl Strategy<Value = Vec<Quote>> {
    proptest::collection::vec(
        (-5i64..200, "[a-z]{1,6}", "[A-C][a-z]{0,3}")
            .prop_map(|(id, text, category)| Quote::new(id, text, category)),
        0..15,
    )
}

/// Generates quote input; blank entries are rejected by the store.
fn arb_new_quotes() -> impl Strategy<Value = Vec<NewQuote>> {
    proptest::collection::vec(
        ("[ a-z]{0,6}", "[ A-C]{0,3}").prop_map(|(text, category)| NewQuote::new(text, category)),
        1..10,
    )
}

fn load(snapshot: &[Quote]) -> (tokio::runtime::Runtime, QuoteService) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let raw = serde_json::to_string(snapshot).unwrap();
    let store = Arc::new(InMemoryKeyValueStore::with_entries([(QUOTES_KEY, raw)]));
    let service = rt
        .block_on(QuoteService::load(store, Arc::new(NoOpDomainEventSink)))
        .unwrap();
    (rt, service)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Accepted additions get strictly increasing ids above every existing id.
    #[test]
    fn prop_add_ids_strictly_increase(snapshot in arb_snapshot(), inputs in arb_new_quotes()) {
        let (rt, service) = load(&snapshot);
        let mut last = snapshot.iter().map(|q| q.id).max().unwrap_or(0).max(0);

        for input in inputs {
            let accepted = !input.text.trim().is_empty() && !input.category.trim().is_empty();
            let result = rt.block_on(service.add_quote(input));
            prop_assert_eq!(result.is_ok(), accepted);
            if let Ok(quote) = result {
                prop_assert!(quote.id > last);
                last = quote.id;
            }
        }
    }

    /// The "all" filter returns the full collection in order.
    #[test]
    fn prop_filter_all_is_identity(snapshot in arb_snapshot()) {
        let (_rt, service) = load(&snapshot);
        prop_assert_eq!(service.filtered(ALL_CATEGORIES), snapshot);
    }

    /// Category filters partition the collection by exact category.
    #[test]
    fn prop_category_filters_cover_trimmed_categories(snapshot in arb_snapshot()) {
        let (_rt, service) = load(&snapshot);

        let covered: usize = service
            .all_categories()
            .iter()
            .map(|c| service.filtered(c).len())
            .sum();
        prop_assert_eq!(covered, snapshot.len());
    }
}

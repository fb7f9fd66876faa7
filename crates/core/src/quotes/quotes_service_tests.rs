//! Tests for QuoteService contracts and edge cases.
//!
//! # Contract Points
//!
//! 1. Load: a missing or corrupt snapshot becomes the default set, never an error
//! 2. Add: trimmed input, strictly increasing ids, persisted before visible
//! 3. Import: permissive append, whole-payload rejection on invalid input
//! 4. Merge: one durable write per changing merge, none otherwise
//! 5. A caller dropped mid-write never leaves memory behind the durable snapshot

#[cfg(test)]
mod tests {
    use crate::constants::{ALL_CATEGORIES, LAST_SYNC_KEY, QUOTES_KEY};
    use crate::errors::{DatabaseError, Error, Result, ValidationError};
    use crate::events::{DomainEvent, MockDomainEventSink, NoOpDomainEventSink, QuotesChangeReason};
    use crate::quotes::{
        default_quotes, parse_import, ImportError, LoadSource, NewQuote, Quote, QuoteError,
        QuoteService, QuoteServiceTrait,
    };
    use crate::storage::{InMemoryKeyValueStore, KeyValueStore};
    use crate::sync::ServerWins;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    // =========================================================================
    // Mock KeyValueStore
    // =========================================================================

    /// Wraps an in-memory store, counts writes and can be told to fail them
    /// or to acknowledge them late.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryKeyValueStore,
        fail_writes: AtomicBool,
        slow_reply: AtomicBool,
        writes: AtomicUsize,
    }

    impl FlakyStore {
        fn with_entries(entries: Vec<(&str, &str)>) -> Self {
            Self {
                inner: InMemoryKeyValueStore::with_entries(entries),
                ..Default::default()
            }
        }

        fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn set_slow_reply(&self, slow: bool) {
            self.slow_reply.store(slow, Ordering::SeqCst);
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "Intentional write failure".into(),
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.check()?;
            self.inner.set(key, value).await
        }

        async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
            self.check()?;
            self.inner.set_many(entries).await?;
            if self.slow_reply.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.check()?;
            self.inner.remove(key).await
        }
    }

    async fn load(store: Arc<FlakyStore>) -> QuoteService {
        QuoteService::load(store, Arc::new(NoOpDomainEventSink))
            .await
            .unwrap()
    }

    fn stored_snapshot(store: &FlakyStore) -> Vec<Quote> {
        let raw = store.get(QUOTES_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    // =========================================================================
    // Load
    // =========================================================================

    #[tokio::test]
    async fn test_first_run_initializes_defaults() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;

        assert_eq!(service.load_source(), LoadSource::FirstRun);
        assert_eq!(service.get_quotes(), default_quotes());
        assert_eq!(stored_snapshot(&store), default_quotes());
        assert!(service.last_saved_at().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_defaults() {
        let store = Arc::new(FlakyStore::with_entries(vec![(QUOTES_KEY, "{not json")]));
        let service = load(store.clone()).await;

        assert_eq!(service.load_source(), LoadSource::RecoveredFromCorruption);
        assert_eq!(service.get_quotes(), default_quotes());
        assert_eq!(stored_snapshot(&store), default_quotes());
    }

    #[tokio::test]
    async fn test_wrong_shape_snapshot_falls_back_to_defaults() {
        let store = Arc::new(FlakyStore::with_entries(vec![(
            QUOTES_KEY,
            r#"{"id":1,"text":"a","category":"b"}"#,
        )]));
        let service = load(store).await;

        assert_eq!(service.load_source(), LoadSource::RecoveredFromCorruption);
        assert_eq!(service.get_quotes().len(), 5);
    }

    #[tokio::test]
    async fn test_existing_snapshot_is_loaded_without_writing() {
        let store = Arc::new(FlakyStore::with_entries(vec![(
            QUOTES_KEY,
            r#"[{"id":9,"text":"a","category":"b"}]"#,
        )]));
        let service = load(store.clone()).await;

        assert_eq!(service.load_source(), LoadSource::Snapshot);
        assert_eq!(service.get_quotes(), vec![Quote::new(9, "a", "b")]);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_legacy_millisecond_timestamp_is_understood() {
        let store = Arc::new(FlakyStore::with_entries(vec![
            (QUOTES_KEY, "[]"),
            (LAST_SYNC_KEY, "1700000000000"),
        ]));
        let service = load(store).await;

        let saved = service.last_saved_at().unwrap().unwrap();
        assert_eq!(saved.timestamp(), 1_700_000_000);
    }

    // =========================================================================
    // Add
    // =========================================================================

    #[tokio::test]
    async fn test_add_trims_and_assigns_next_id() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;

        let quote = service
            .add_quote(NewQuote::new("  Keep going.  ", " Motivation "))
            .await
            .unwrap();

        assert_eq!(quote, Quote::new(6, "Keep going.", "Motivation"));
        assert_eq!(service.get_quotes().last(), Some(&quote));
        assert_eq!(stored_snapshot(&store).last(), Some(&quote));
    }

    #[tokio::test]
    async fn test_add_into_empty_store_starts_at_one() {
        let store = Arc::new(FlakyStore::with_entries(vec![(QUOTES_KEY, "[]")]));
        let service = load(store).await;

        let quote = service.add_quote(NewQuote::new("a", "b")).await.unwrap();
        assert_eq!(quote.id, 1);
    }

    #[tokio::test]
    async fn test_add_ids_follow_max_not_length() {
        let store = Arc::new(FlakyStore::with_entries(vec![(
            QUOTES_KEY,
            r#"[{"id":40,"text":"a","category":"b"},{"id":3,"text":"c","category":"d"}]"#,
        )]));
        let service = load(store).await;

        let first = service.add_quote(NewQuote::new("x", "y")).await.unwrap();
        let second = service.add_quote(NewQuote::new("x", "y")).await.unwrap();
        assert_eq!((first.id, second.id), (41, 42));
    }

    #[tokio::test]
    async fn test_add_after_largest_id_is_rejected() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        service
            .import_quotes(r#"[{"id": 9223372036854775807, "text": "a", "category": "b"}]"#)
            .await
            .unwrap();
        let writes_before = store.writes();

        let err = service
            .add_quote(NewQuote::new("x", "y"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidInput(_))
        ));
        assert_eq!(store.writes(), writes_before);
        assert_eq!(service.get_quotes().len(), 6);
    }

    #[tokio::test]
    async fn test_import_without_id_after_largest_id_is_rejected() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;

        let err = service
            .import_quotes(
                r#"[{"id": 9223372036854775807, "text": "a", "category": "b"}, {"text": "c", "category": "d"}]"#,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Import(ImportError::IdsExhausted(i64::MAX))
        ));
        assert_eq!(service.get_quotes(), default_quotes());
    }

    #[tokio::test]
    async fn test_add_rejects_blank_fields() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        let writes_before = store.writes();

        let err = service
            .add_quote(NewQuote::new("   ", "Life"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ref f)) if f == "text"
        ));

        let err = service
            .add_quote(NewQuote::new("text", "\t"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ref f)) if f == "category"
        ));

        assert_eq!(service.get_quotes().len(), 5);
        assert_eq!(store.writes(), writes_before);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        store.set_fail_writes(true);

        assert!(service.add_quote(NewQuote::new("a", "b")).await.is_err());
        assert_eq!(service.get_quotes(), default_quotes());

        store.set_fail_writes(false);
        let quote = service.add_quote(NewQuote::new("a", "b")).await.unwrap();
        assert_eq!(quote.id, 6);
    }

    #[tokio::test]
    async fn test_add_emits_quotes_changed() {
        let sink = MockDomainEventSink::new();
        let service = QuoteService::load(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(sink.clone()),
        )
        .await
        .unwrap();

        service.add_quote(NewQuote::new("a", "b")).await.unwrap();

        assert_eq!(
            sink.events(),
            vec![DomainEvent::quotes_changed(QuotesChangeReason::Added, vec![6])]
        );
    }

    #[tokio::test]
    async fn test_save_quotes_replaces_collection() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        let replacement = vec![Quote::new(3, "x", "y"), Quote::new(8, "z", "y")];

        service.save_quotes(replacement.clone()).await.unwrap();

        assert_eq!(service.get_quotes(), replacement);
        assert_eq!(stored_snapshot(&store), replacement);
        let next = service.add_quote(NewQuote::new("a", "b")).await.unwrap();
        assert_eq!(next.id, 9);
    }

    // =========================================================================
    // Categories and filtering
    // =========================================================================

    #[tokio::test]
    async fn test_all_categories_are_distinct_trimmed_sorted() {
        let store = Arc::new(FlakyStore::with_entries(vec![(
            QUOTES_KEY,
            r#"[
                {"id":1,"text":"a","category":"Life"},
                {"id":2,"text":"b","category":" Life "},
                {"id":3,"text":"c","category":"Art"},
                {"id":4,"text":"d","category":"   "},
                {"id":5,"text":"e","category":"life"}
            ]"#,
        )]));
        let service = load(store).await;

        assert_eq!(service.all_categories(), vec!["Art", "Life", "life"]);
    }

    #[tokio::test]
    async fn test_filtered_matches_exactly_and_keeps_order() {
        let store = Arc::new(FlakyStore::with_entries(vec![(
            QUOTES_KEY,
            r#"[
                {"id":3,"text":"a","category":"Life"},
                {"id":1,"text":"b","category":"Art"},
                {"id":2,"text":"c","category":"Life"},
                {"id":4,"text":"d","category":"life"}
            ]"#,
        )]));
        let service = load(store).await;

        let ids: Vec<i64> = service.filtered("Life").iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(service.filtered(ALL_CATEGORIES), service.get_quotes());
        assert!(service.filtered("Missing").is_empty());
    }

    #[tokio::test]
    async fn test_get_quote() {
        let service = load(Arc::new(FlakyStore::default())).await;

        assert_eq!(service.get_quote(2).unwrap().category, "Life");
        assert!(matches!(
            service.get_quote(77),
            Err(Error::Quote(QuoteError::NotFound(77)))
        ));
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    #[tokio::test]
    async fn test_import_appends_valid_records() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;

        let summary = service
            .import_quotes(r#"[{"text":"X","category":"Y"},{"bad":1}]"#)
            .await
            .unwrap();

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        let quotes = service.get_quotes();
        assert_eq!(quotes.len(), 6);
        assert_eq!(quotes[5], Quote::new(6, "X", "Y"));
        assert_eq!(stored_snapshot(&store), quotes);
    }

    #[tokio::test]
    async fn test_import_keeps_colliding_ids() {
        let service = load(Arc::new(FlakyStore::default())).await;

        service
            .import_quotes(r#"[{"id":1,"text":"dup","category":"Y"}]"#)
            .await
            .unwrap();

        let ids: Vec<i64> = service.get_quotes().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 1]);
        assert_eq!(service.get_quote(1).unwrap(), default_quotes()[0]);
    }

    #[tokio::test]
    async fn test_invalid_import_changes_nothing() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        let writes_before = store.writes();

        let err = service.import_quotes(r#"{"a":1}"#).await.unwrap_err();
        assert!(matches!(err, Error::Import(ImportError::NotAnArray)));

        let err = service.import_quotes(r#"[{"bad":1}]"#).await.unwrap_err();
        assert!(matches!(err, Error::Import(ImportError::NoValidQuotes)));

        assert_eq!(service.get_quotes(), default_quotes());
        assert_eq!(store.writes(), writes_before);
    }

    #[tokio::test]
    async fn test_export_then_import_round_trips() {
        let service = load(Arc::new(FlakyStore::default())).await;
        service.add_quote(NewQuote::new("a", "b")).await.unwrap();
        let exported = service.export_quotes().unwrap();

        let parsed = parse_import(&exported, 0).unwrap();
        assert_eq!(parsed.quotes, service.get_quotes());

        let fresh = load(Arc::new(FlakyStore::with_entries(vec![(QUOTES_KEY, "[]")]))).await;
        fresh.import_quotes(&exported).await.unwrap();
        assert_eq!(fresh.get_quotes(), service.get_quotes());
    }

    #[tokio::test]
    async fn test_export_empty_store_fails() {
        let service = load(Arc::new(FlakyStore::with_entries(vec![(QUOTES_KEY, "[]")]))).await;
        assert!(matches!(
            service.export_quotes(),
            Err(Error::Quote(QuoteError::NothingToExport))
        ));
    }

    // =========================================================================
    // Merge
    // =========================================================================

    #[tokio::test]
    async fn test_apply_merge_persists_once() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        let writes_before = store.writes();

        let outcome = service
            .apply_merge(
                vec![Quote::new(5, "B", "Motivation"), Quote::new(10, "new", "Welcome")],
                &ServerWins,
            )
            .await
            .unwrap();

        assert_eq!(outcome.new_ids, vec![10]);
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(store.writes(), writes_before + 1);
        assert_eq!(service.get_quote(5).unwrap().text, "B");
        assert_eq!(stored_snapshot(&store), service.get_quotes());
    }

    #[tokio::test]
    async fn test_apply_merge_without_changes_skips_write() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        let writes_before = store.writes();

        let outcome = service
            .apply_merge(default_quotes(), &ServerWins)
            .await
            .unwrap();

        assert!(!outcome.has_changes());
        assert_eq!(outcome.unchanged, 5);
        assert_eq!(store.writes(), writes_before);
    }

    #[tokio::test]
    async fn test_apply_merge_write_failure_keeps_local_state() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        store.set_fail_writes(true);

        let result = service
            .apply_merge(vec![Quote::new(1, "changed", "x")], &ServerWins)
            .await;

        assert!(result.is_err());
        assert_eq!(service.get_quotes(), default_quotes());
    }

    #[tokio::test]
    async fn test_dropped_merge_still_updates_memory() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        store.set_slow_reply(true);

        let merge = service.apply_merge(vec![Quote::new(10, "new", "Welcome")], &ServerWins);
        let timed_out = tokio::time::timeout(Duration::from_millis(50), merge)
            .await
            .is_err();
        assert!(timed_out);
        assert!(stored_snapshot(&store).iter().any(|q| q.id == 10));

        store.set_slow_reply(false);
        let added = service.add_quote(NewQuote::new("x", "y")).await.unwrap();

        assert_eq!(added.id, 11);
        assert!(service.get_quote(10).is_ok());
        let stored = stored_snapshot(&store);
        assert!(stored.iter().any(|q| q.id == 10));
        assert_eq!(stored, service.get_quotes());
    }

    #[tokio::test]
    async fn test_dropped_add_still_updates_memory() {
        let store = Arc::new(FlakyStore::default());
        let service = load(store.clone()).await;
        store.set_slow_reply(true);

        let add = service.add_quote(NewQuote::new("first", "c"));
        assert!(tokio::time::timeout(Duration::from_millis(50), add)
            .await
            .is_err());

        store.set_slow_reply(false);
        let second = service.add_quote(NewQuote::new("second", "c")).await.unwrap();

        assert_eq!(second.id, 7);
        assert_eq!(service.get_quote(6).unwrap().text, "first");
        assert_eq!(stored_snapshot(&store), service.get_quotes());
    }
}

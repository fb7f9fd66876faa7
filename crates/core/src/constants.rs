/// Durable key holding the serialized quote snapshot.
pub const QUOTES_KEY: &str = "quotes";

/// Durable key holding the timestamp of the last snapshot write.
pub const LAST_SYNC_KEY: &str = "lastSync";

/// Durable key holding the selected category filter.
pub const LAST_FILTER_KEY: &str = "lastFilter";

/// Session key holding the index of the last displayed quote.
pub const LAST_QUOTE_INDEX_KEY: &str = "lastQuoteIndex";

/// Filter sentinel that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// File name offered for exports.
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Default interval between scheduled syncs.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Category assigned to records mapped from the welcome-style remote payload.
pub const WELCOME_CATEGORY: &str = "Welcome";

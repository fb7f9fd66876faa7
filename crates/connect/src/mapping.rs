//! Mapping from remote payloads to quotes.

use std::str::FromStr;

use log::debug;
use quotebook_core::constants::WELCOME_CATEGORY;
use quotebook_core::quotes::Quote;

use crate::error::Result;
use crate::types::{RemoteQuote, RemoteUser};

/// How the remote payload is turned into quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMapping {
    /// `[{id, company: {name}}]`, one welcome quote per record.
    #[default]
    Welcome,
    /// `[{id, text, category}]`, taken as is.
    Direct,
}

impl FromStr for QuoteMapping {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "welcome" => Ok(QuoteMapping::Welcome),
            "direct" => Ok(QuoteMapping::Direct),
            other => Err(format!("Unknown quote mapping '{}'", other)),
        }
    }
}

/// Decode a response body into quotes.
///
/// The whole payload is rejected if any record fails to decode.
pub fn map_payload(body: &str, mapping: QuoteMapping) -> Result<Vec<Quote>> {
    let quotes: Vec<Quote> = match mapping {
        QuoteMapping::Welcome => serde_json::from_str::<Vec<RemoteUser>>(body)?
            .into_iter()
            .map(|user| {
                Quote::new(
                    user.id,
                    format!("Welcome to {}!", user.company.name),
                    WELCOME_CATEGORY,
                )
            })
            .collect(),
        QuoteMapping::Direct => serde_json::from_str::<Vec<RemoteQuote>>(body)?
            .into_iter()
            .map(|q| Quote::new(q.id, q.text, q.category))
            .collect(),
    };
    debug!("Mapped {} remote records ({:?})", quotes.len(), mapping);
    Ok(quotes)
}

use serde::{Deserialize, Serialize};

use crate::quotes::Quote;

/// A quote picked for display from the current filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedQuote {
    /// Position within the filtered view
    pub index: usize,
    /// Size of the filtered view
    pub total: usize,
    /// Filter the view was built with
    pub filter: String,
    pub quote: Quote,
}

//! Session view state: category filter and last-viewed quote.

mod session_model;
mod session_service;

pub use session_model::DisplayedQuote;
pub use session_service::{SessionService, SessionServiceTrait};

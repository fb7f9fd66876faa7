//! Wire types of the remote payloads.

use serde::Deserialize;

/// Company block of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteCompany {
    pub name: String,
}

/// A user record, as served by the default remote endpoint.
///
/// Only the fields the mapping reads are declared; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUser {
    pub id: i64,
    pub company: RemoteCompany,
}

/// A record already shaped like a quote.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteQuote {
    pub id: i64,
    pub text: String,
    pub category: String,
}

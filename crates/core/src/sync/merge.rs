//! Merge of a remote record set into the local one.
//!
//! Records are matched by id. The conflict policy is pluggable; the
//! orchestration in [`super::SyncService`] never looks at record contents.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::quotes::Quote;

/// Which side a conflict resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    KeepLocal,
    TakeRemote,
}

/// Conflict policy applied when a remote record shares an id with a local one.
pub trait MergePolicy: Send + Sync {
    /// Stable name used in reports and configuration.
    fn name(&self) -> &'static str;

    fn resolve(&self, local: &Quote, remote: &Quote) -> Resolution;
}

/// The remote record always replaces the local one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerWins;

impl MergePolicy for ServerWins {
    fn name(&self) -> &'static str {
        "server-wins"
    }

    fn resolve(&self, _local: &Quote, _remote: &Quote) -> Resolution {
        Resolution::TakeRemote
    }
}

/// The local record is always kept; only new remote records are taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWins;

impl MergePolicy for LocalWins {
    fn name(&self) -> &'static str {
        "local-wins"
    }

    fn resolve(&self, _local: &Quote, _remote: &Quote) -> Resolution {
        Resolution::KeepLocal
    }
}

/// Configurable selection of the shipped policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicyKind {
    #[default]
    ServerWins,
    LocalWins,
}

impl MergePolicyKind {
    pub fn into_policy(self) -> Arc<dyn MergePolicy> {
        match self {
            MergePolicyKind::ServerWins => Arc::new(ServerWins),
            MergePolicyKind::LocalWins => Arc::new(LocalWins),
        }
    }
}

impl FromStr for MergePolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server-wins" | "server_wins" | "server" => Ok(MergePolicyKind::ServerWins),
            "local-wins" | "local_wins" | "local" => Ok(MergePolicyKind::LocalWins),
            other => Err(format!("Unknown merge policy '{}'", other)),
        }
    }
}

/// A remote record that collided with a local one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConflict {
    pub local: Quote,
    pub remote: Quote,
    pub resolution: Resolution,
}

/// Result of merging a remote set into the local one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// The merged collection, local order first, new remote records appended.
    pub quotes: Vec<Quote>,
    /// Ids of remote records that had no local counterpart.
    pub new_ids: Vec<i64>,
    /// Remote records that shared an id with a differing local record.
    pub conflicts: Vec<ResolvedConflict>,
    /// Remote records identical to their local counterpart.
    pub unchanged: usize,
    /// Remote records dropped because their id repeated within the payload.
    pub duplicate_remote: usize,
}

impl MergeOutcome {
    /// True when the merged collection differs from the local one.
    pub fn has_changes(&self) -> bool {
        !self.new_ids.is_empty()
            || self
                .conflicts
                .iter()
                .any(|c| c.resolution == Resolution::TakeRemote)
    }

    /// Ids whose stored content changed.
    pub fn changed_ids(&self) -> Vec<i64> {
        self.conflicts
            .iter()
            .filter(|c| c.resolution == Resolution::TakeRemote)
            .map(|c| c.remote.id)
            .chain(self.new_ids.iter().copied())
            .collect()
    }
}

/// Merge `remote` into `local`.
///
/// - A remote id matching a local id is a conflict unless both records are
///   identical; `policy` picks the survivor and replaces the whole record.
/// - A remote id with no local match is appended in remote order.
/// - Local records absent from `remote` are kept.
/// - Within `remote`, the first occurrence of an id wins.
/// - If `local` already holds duplicate ids, the first occurrence is used.
pub fn merge_quotes(local: &[Quote], remote: Vec<Quote>, policy: &dyn MergePolicy) -> MergeOutcome {
    let mut merged = local.to_vec();
    let mut positions: HashMap<i64, usize> = HashMap::with_capacity(local.len());
    for (pos, quote) in local.iter().enumerate() {
        positions.entry(quote.id).or_insert(pos);
    }

    let mut outcome = MergeOutcome::default();
    let mut seen_remote: HashSet<i64> = HashSet::with_capacity(remote.len());

    for remote_quote in remote {
        if !seen_remote.insert(remote_quote.id) {
            warn!(
                "Remote payload repeats quote id {}, ignoring the later record",
                remote_quote.id
            );
            outcome.duplicate_remote += 1;
            continue;
        }

        match positions.get(&remote_quote.id) {
            Some(&pos) => {
                let local_quote = &merged[pos];
                if *local_quote == remote_quote {
                    outcome.unchanged += 1;
                    continue;
                }
                let resolution = policy.resolve(local_quote, &remote_quote);
                let conflict = ResolvedConflict {
                    local: local_quote.clone(),
                    remote: remote_quote.clone(),
                    resolution,
                };
                if resolution == Resolution::TakeRemote {
                    merged[pos] = remote_quote;
                }
                outcome.conflicts.push(conflict);
            }
            None => {
                outcome.new_ids.push(remote_quote.id);
                merged.push(remote_quote);
            }
        }
    }

    outcome.quotes = merged;
    outcome
}

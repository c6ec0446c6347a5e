use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use threadscribe_common::AuthorId;

/// Point-in-time copy of the author ledger, as persisted to disk.
///
/// `total_count` always equals `authors.len()` at the moment the snapshot is
/// taken; it is derived, never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// De-duplicated author ids in stable order.
    pub authors: Vec<AuthorId>,
    /// When this snapshot was taken.
    pub last_updated: DateTime<Utc>,
    pub total_count: usize,
}

impl LedgerSnapshot {
    /// Build a snapshot from an ordered, de-duplicated author sequence.
    #[must_use]
    pub fn new(authors: Vec<AuthorId>) -> Self {
        let total_count = authors.len();
        Self {
            authors,
            last_updated: Utc::now(),
            total_count,
        }
    }

    /// Snapshot with no authors (fresh start).
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

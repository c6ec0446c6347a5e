//! Persistence trait for ledger snapshots.

use async_trait::async_trait;

use threadscribe_common::Result;

use crate::types::LedgerSnapshot;

/// Persistence backend for the author ledger.
///
/// The storage location is bound at construction. `load` is best-effort:
/// implementations return an empty snapshot when no usable state exists
/// rather than failing the caller. `save` must write the complete snapshot
/// or leave the previously stored one intact.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Result<LedgerSnapshot>;
    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<()>;
}

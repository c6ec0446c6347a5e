//! In-memory store for testing.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use threadscribe_common::{Error, Result};

use crate::{store::SnapshotStore, types::LedgerSnapshot};

/// In-memory store. No persistence — for tests only.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<LedgerSnapshot>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently saved snapshot, if any.
    #[must_use]
    pub fn stored(&self) -> Option<LedgerSnapshot> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Seed the store as if a snapshot had been persisted earlier.
    pub fn seed(&self, snapshot: LedgerSnapshot) {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
    }

    /// Number of completed `save` calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }

    /// Make subsequent `save` calls fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Release);
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<LedgerSnapshot> {
        Ok(self.stored().unwrap_or_else(LedgerSnapshot::empty))
    }

    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::Acquire) {
            return Err(Error::persistence(
                "memory",
                std::io::Error::other("save disabled"),
            ));
        }
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, threadscribe_common::AuthorId};

    #[tokio::test]
    async fn load_empty_by_default() {
        let store = MemoryStore::new();
        assert_eq!(store.load().await.unwrap().total_count, 0);
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MemoryStore::new();
        let snapshot = LedgerSnapshot::new(vec![AuthorId::new("u1")]);
        store.save(&snapshot).await.unwrap();

        assert_eq!(store.load().await.unwrap(), snapshot);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn failing_saves_error_out() {
        let store = MemoryStore::new();
        store.fail_saves(true);

        let snapshot = LedgerSnapshot::empty();
        assert!(store.save(&snapshot).await.is_err());
        assert_eq!(store.save_count(), 0);
    }
}

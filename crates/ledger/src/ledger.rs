//! The in-memory author set and its save-on-mutation discipline.

use std::{
    collections::BTreeSet,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::{debug, warn};

use threadscribe_common::{AuthorId, Result};

use crate::{store::SnapshotStore, types::LedgerSnapshot};

/// Deduplicated set of post authors with durable snapshots.
///
/// Membership lives behind a std `Mutex` that is never held across await
/// points; every successful insert triggers a snapshot save. Saves are
/// serialized through an async lock whose guarded value is the latest
/// generation already persisted. A save requested while another is in
/// flight waits its turn, then skips itself if a later save has already
/// covered its mutation, so bursts of inserts coalesce into few writes.
pub struct AuthorLedger {
    authors: Mutex<BTreeSet<AuthorId>>,
    store: Arc<dyn SnapshotStore>,
    /// Bumped once per successful mutation.
    generation: AtomicU64,
    /// Serializes snapshot writes; holds the generation last persisted.
    save_lock: tokio::sync::Mutex<u64>,
}

impl AuthorLedger {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            authors: Mutex::new(BTreeSet::new()),
            store,
            generation: AtomicU64::new(0),
            save_lock: tokio::sync::Mutex::new(0),
        }
    }

    /// Load the persisted snapshot into the ledger.
    ///
    /// Returns the number of authors in the ledger afterwards. A load
    /// failure is logged and treated as an empty start.
    pub async fn hydrate(&self) -> usize {
        match self.store.load().await {
            Ok(snapshot) => {
                let mut authors = self.lock();
                authors.extend(snapshot.authors);
                authors.len()
            },
            Err(e) => {
                warn!(error = %e, "failed to load persisted authors, starting empty");
                0
            },
        }
    }

    /// Insert `id` if absent. Returns true exactly once per distinct id,
    /// regardless of how calls interleave.
    ///
    /// A successful insert schedules a snapshot save before returning; the
    /// save itself may fail without affecting the in-memory set.
    pub async fn add_if_absent(&self, id: AuthorId) -> bool {
        let inserted = { self.lock().insert(id) };
        if inserted {
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            self.persist(generation).await;
        }
        inserted
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    /// Consistent point-in-time copy of the ledger.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let authors: Vec<AuthorId> = self.lock().iter().cloned().collect();
        LedgerSnapshot::new(authors)
    }

    /// Write the latest state out unconditionally, waiting for any save
    /// already in flight. Used for the shutdown flush; unlike the
    /// per-mutation saves, a failure here is returned to the caller.
    pub async fn flush(&self) -> Result<()> {
        let mut saved = self.save_lock.lock().await;
        let covered = self.generation.load(Ordering::Acquire);
        let snapshot = self.snapshot();
        self.store.save(&snapshot).await?;
        *saved = covered;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<AuthorId>> {
        self.authors.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serialized, coalescing save of the current snapshot.
    async fn persist(&self, my_generation: u64) {
        let mut saved = self.save_lock.lock().await;
        if *saved >= my_generation {
            // A save that ran while we waited already covered this mutation.
            return;
        }

        // Read the generation before copying the set: the snapshot then
        // contains every mutation counted in `covered`.
        let covered = self.generation.load(Ordering::Acquire);
        let snapshot = self.snapshot();
        match self.store.save(&snapshot).await {
            Ok(()) => {
                *saved = covered;
                debug!(total = snapshot.total_count, "persisted author snapshot");
            },
            Err(e) => warn!(error = %e, "failed to persist author snapshot"),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{store_file::FileStore, store_memory::MemoryStore},
        std::sync::atomic::AtomicUsize,
        tempfile::TempDir,
    };

    fn ledger_with_memory() -> (Arc<AuthorLedger>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(AuthorLedger::new(Arc::clone(&store) as Arc<dyn SnapshotStore>));
        (ledger, store)
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let (ledger, _store) = ledger_with_memory();

        assert!(ledger.add_if_absent(AuthorId::new("u1")).await);
        assert!(!ledger.add_if_absent(AuthorId::new("u1")).await);
        assert_eq!(ledger.size(), 1);
    }

    #[tokio::test]
    async fn snapshot_is_ordered_and_counted() {
        let (ledger, _store) = ledger_with_memory();
        ledger.add_if_absent(AuthorId::new("b")).await;
        ledger.add_if_absent(AuthorId::new("a")).await;

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.authors, vec![AuthorId::new("a"), AuthorId::new("b")]);
        assert_eq!(snapshot.total_count, 2);
    }

    #[tokio::test]
    async fn every_new_author_is_persisted() {
        let (ledger, store) = ledger_with_memory();

        ledger.add_if_absent(AuthorId::new("u1")).await;
        ledger.add_if_absent(AuthorId::new("u2")).await;
        // Duplicate: no mutation, no save.
        ledger.add_if_absent(AuthorId::new("u1")).await;

        assert_eq!(store.save_count(), 2);
        let stored = store.stored().unwrap();
        assert_eq!(stored.total_count, 2);
    }

    #[tokio::test]
    async fn hydrate_restores_persisted_authors() {
        let (ledger, store) = ledger_with_memory();
        store.seed(LedgerSnapshot::new(vec![
            AuthorId::new("u1"),
            AuthorId::new("u2"),
        ]));

        assert_eq!(ledger.hydrate().await, 2);
        assert!(!ledger.add_if_absent(AuthorId::new("u1")).await);
        assert_eq!(ledger.size(), 2);
    }

    #[tokio::test]
    async fn save_failure_leaves_memory_authoritative() {
        let (ledger, store) = ledger_with_memory();
        store.fail_saves(true);

        assert!(ledger.add_if_absent(AuthorId::new("u1")).await);
        assert_eq!(ledger.size(), 1);
        assert!(store.stored().is_none());

        // A later flush against a healthy store writes everything out.
        store.fail_saves(false);
        ledger.flush().await.unwrap();
        assert_eq!(store.stored().unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn flush_failure_propagates() {
        let (ledger, store) = ledger_with_memory();
        ledger.add_if_absent(AuthorId::new("u1")).await;
        store.fail_saves(true);

        assert!(ledger.flush().await.is_err());
    }

    #[tokio::test]
    async fn concurrent_adds_of_same_author_insert_once() {
        let (ledger, _store) = ledger_with_memory();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let ledger = Arc::clone(&ledger);
            tasks.spawn(async move { ledger.add_if_absent(AuthorId::new("u1")).await });
        }

        let mut inserted = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(ledger.size(), 1);
    }

    #[tokio::test]
    async fn round_trip_through_file_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("authors.json");

        let store = Arc::new(FileStore::new(&path));
        let ledger = AuthorLedger::new(Arc::clone(&store) as Arc<dyn SnapshotStore>);
        ledger.add_if_absent(AuthorId::new("u1")).await;
        ledger.add_if_absent(AuthorId::new("u2")).await;
        ledger.flush().await.unwrap();

        let reloaded = AuthorLedger::new(Arc::new(FileStore::new(&path)));
        assert_eq!(reloaded.hydrate().await, 2);
        assert_eq!(reloaded.snapshot().authors, ledger.snapshot().authors);
    }

    /// Store whose saves block until permits are released, to hold a save
    /// in flight while more mutations arrive.
    struct GatedStore {
        gate: tokio::sync::Semaphore,
        saves: AtomicUsize,
        last: Mutex<Option<LedgerSnapshot>>,
    }

    #[async_trait::async_trait]
    impl SnapshotStore for GatedStore {
        async fn load(&self) -> Result<LedgerSnapshot> {
            Ok(LedgerSnapshot::empty())
        }

        async fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
            let _permit = self.gate.acquire().await.unwrap();
            *self.last.lock().unwrap() = Some(snapshot.clone());
            self.saves.fetch_add(1, Ordering::AcqRel);
            Ok(())
        }
    }

    #[tokio::test]
    async fn saves_coalesce_while_one_is_in_flight() {
        let store = Arc::new(GatedStore {
            gate: tokio::sync::Semaphore::new(0),
            saves: AtomicUsize::new(0),
            last: Mutex::new(None),
        });
        let ledger = Arc::new(AuthorLedger::new(Arc::clone(&store) as Arc<dyn SnapshotStore>));

        let mut tasks = tokio::task::JoinSet::new();
        for id in ["a", "b", "c", "d"] {
            let ledger = Arc::clone(&ledger);
            tasks.spawn(async move { ledger.add_if_absent(AuthorId::new(id)).await });
        }

        // Let every insert land before any save can complete.
        while ledger.size() < 4 {
            tokio::task::yield_now().await;
        }
        store.gate.add_permits(16);
        while tasks.join_next().await.is_some() {}

        let saves = store.saves.load(Ordering::Acquire);
        assert!((1..=2).contains(&saves), "expected coalesced saves, got {saves}");
        assert_eq!(store.last.lock().unwrap().as_ref().unwrap().total_count, 4);
    }
}

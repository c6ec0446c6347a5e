//! Durable author ledger: the deduplicated set of post authors and its
//! JSON snapshot persistence.
//!
//! The ledger is the single owner of author-set state. All mutation goes
//! through [`AuthorLedger::add_if_absent`]; every successful insert triggers
//! a serialized, coalescing save of the full snapshot through a
//! [`SnapshotStore`].

pub mod ledger;
pub mod store;
pub mod store_file;
pub mod store_memory;
pub mod types;

pub use {
    ledger::AuthorLedger, store::SnapshotStore, store_file::FileStore, store_memory::MemoryStore,
    types::LedgerSnapshot,
};

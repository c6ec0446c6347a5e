//! Post-author tracking engine.
//!
//! Reconciles the backlog of existing forum posts with a live stream of
//! newly created ones, recording each distinct starter author exactly once
//! in a durable ledger. The platform itself is reached only through the
//! [`client::ForumClient`] seam and the [`client::GatewayEvent`] stream, so
//! the engine runs unchanged against any gateway adapter.

pub mod client;
pub mod monitor;
pub mod reconcile;
mod record;
pub mod service;

#[cfg(test)]
pub(crate) mod testutil;

pub use {
    client::{
        EventReceiver, EventSender, ForumChannel, ForumClient, GatewayEvent, PostDescriptor,
        StarterMessage,
    },
    monitor::LiveMonitor,
    reconcile::{ReconcileReport, Reconciler},
    service::{Phase, TrackerService},
};

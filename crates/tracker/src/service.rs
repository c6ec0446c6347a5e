//! Startup and shutdown sequencing for the tracking pipeline.

use std::sync::Arc;

use {
    tokio::sync::watch,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use {
    threadscribe_common::{ChannelId, GuildId, Result},
    threadscribe_ledger::AuthorLedger,
};

use crate::{
    client::{EventReceiver, ForumClient},
    monitor::LiveMonitor,
    reconcile::Reconciler,
};

/// Lifecycle phase of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Reconciling,
    Monitoring,
    ShuttingDown,
    Stopped,
}

/// Sequences startup (load → reconcile → monitor) and shutdown (flush).
///
/// Faults during startup never terminate the service: a failed load starts
/// empty and a failed reconciliation still advances to live monitoring,
/// since partial data is preferred over no service.
pub struct TrackerService {
    client: Arc<dyn ForumClient>,
    ledger: Arc<AuthorLedger>,
    guild_id: GuildId,
    channel_id: ChannelId,
    phase: watch::Sender<Phase>,
}

impl TrackerService {
    pub fn new(
        client: Arc<dyn ForumClient>,
        ledger: Arc<AuthorLedger>,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Self {
        let (phase, _) = watch::channel(Phase::Starting);
        Self {
            client,
            ledger,
            guild_id,
            channel_id,
            phase,
        }
    }

    /// Subscribe to lifecycle phase changes.
    pub fn phases(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Drive the full lifecycle.
    ///
    /// Returns once `shutdown` has fired (or the event stream ended) and the
    /// final flush completed; only the flush's own failure is propagated.
    pub async fn run(&self, events: EventReceiver, shutdown: CancellationToken) -> Result<()> {
        self.set_phase(Phase::Starting);
        let restored = self.ledger.hydrate().await;
        info!(restored, "author ledger loaded");

        self.set_phase(Phase::Reconciling);
        let reconciler = Reconciler::new(Arc::clone(&self.client), Arc::clone(&self.ledger));
        match reconciler.reconcile(self.guild_id, self.channel_id).await {
            Ok(report) => {
                if !report.errors.is_empty() {
                    warn!(errors = report.errors.len(), "some posts could not be scanned");
                }
            },
            Err(e) => {
                warn!(error = %e, "reconciliation aborted, continuing with live monitoring");
            },
        }

        self.set_phase(Phase::Monitoring);
        let monitor = LiveMonitor::new(
            Arc::clone(&self.client),
            Arc::clone(&self.ledger),
            self.channel_id,
        );
        monitor.run(events, shutdown).await;

        self.set_phase(Phase::ShuttingDown);
        info!(total_authors = self.ledger.size(), "flushing author ledger");
        let flushed = self.ledger.flush().await;

        self.set_phase(Phase::Stopped);
        flushed
    }

    fn set_phase(&self, phase: Phase) {
        info!(?phase, "tracker phase");
        self.phase.send_replace(phase);
    }
}

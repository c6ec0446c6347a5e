//! One-shot bulk reconciliation of existing forum posts.

use std::{collections::HashSet, sync::Arc};

use tracing::{info, warn};

use {
    threadscribe_common::{ChannelId, Error, GuildId, Result, ThreadId},
    threadscribe_ledger::AuthorLedger,
};

use crate::{client::ForumClient, record::PostRecorder};

/// Outcome of a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Posts examined: active ∪ archived, de-duplicated by thread id.
    pub scanned: usize,
    /// Authors inserted into the ledger by this pass.
    pub newly_logged: usize,
    /// Per-post retrieval failures, in scan order.
    pub errors: Vec<(ThreadId, Error)>,
}

/// Merges the backlog of existing posts into the author ledger.
///
/// The merge is idempotent: re-running against an unchanged channel reports
/// zero newly logged authors and leaves the ledger untouched.
pub struct Reconciler {
    client: Arc<dyn ForumClient>,
    recorder: PostRecorder,
}

impl Reconciler {
    pub fn new(client: Arc<dyn ForumClient>, ledger: Arc<AuthorLedger>) -> Self {
        Self {
            recorder: PostRecorder {
                client: Arc::clone(&client),
                ledger,
            },
            client,
        }
    }

    /// Scan every post under `channel_id` and record each resolvable
    /// starter author.
    ///
    /// Individual retrieval failures are recorded in the report and skipped;
    /// only precondition or enumeration failures abort the pass.
    pub async fn reconcile(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<ReconcileReport> {
        let forum = self.client.verify_forum(guild_id, channel_id).await?;
        info!(channel = %forum.name, "scanning existing forum posts");

        let mut posts = self.client.active_posts(channel_id).await?;
        posts.extend(self.client.archived_posts(channel_id).await?);

        // Active and archived listings can overlap; keep the first sighting
        // of each thread id.
        let mut seen = HashSet::new();
        posts.retain(|post| seen.insert(post.thread_id));

        info!(count = posts.len(), "found posts to scan");

        let mut report = ReconcileReport {
            scanned: posts.len(),
            ..ReconcileReport::default()
        };
        for post in &posts {
            match self.recorder.record(post).await {
                Ok(true) => report.newly_logged += 1,
                Ok(false) => {},
                Err(e) => {
                    warn!(thread_id = %post.thread_id, error = %e, "skipping post");
                    report.errors.push((post.thread_id, e));
                },
            }
        }

        info!(
            scanned = report.scanned,
            newly_logged = report.newly_logged,
            errors = report.errors.len(),
            total_authors = self.recorder.ledger.size(),
            "reconciliation complete"
        );
        Ok(report)
    }
}

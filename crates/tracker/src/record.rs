//! Author-recording step shared by the bulk scan and the live monitor.

use std::sync::Arc;

use tracing::{debug, info};

use {threadscribe_common::Result, threadscribe_ledger::AuthorLedger};

use crate::client::{ForumClient, PostDescriptor};

/// Resolves a post's starter author and records it in the ledger.
pub(crate) struct PostRecorder {
    pub client: Arc<dyn ForumClient>,
    pub ledger: Arc<AuthorLedger>,
}

impl PostRecorder {
    /// Returns `Ok(true)` when the post's author was newly recorded.
    ///
    /// A starter message without an attributable author falls back to the
    /// enumeration-time attribution when one exists; otherwise the post is
    /// skipped without an error.
    pub(crate) async fn record(&self, post: &PostDescriptor) -> Result<bool> {
        let (author_id, author_name) = match self.client.starter_message(post.thread_id).await? {
            Some(starter) => (starter.author_id, Some(starter.author_name)),
            None => match post.starter_author_id.clone() {
                Some(id) => {
                    debug!(
                        thread_id = %post.thread_id,
                        "starter message unattributed, using thread owner"
                    );
                    (id, None)
                },
                None => {
                    debug!(thread_id = %post.thread_id, "post has no attributable author");
                    return Ok(false);
                },
            },
        };

        let newly = self.ledger.add_if_absent(author_id.clone()).await;
        if newly {
            info!(
                author = %author_id,
                name = author_name.as_deref().unwrap_or("unknown"),
                title = %post.title,
                "new post author logged"
            );
        }
        Ok(newly)
    }
}

//! Live subscription to newly created posts.

use std::sync::Arc;

use {
    tokio::task::JoinSet,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {threadscribe_common::ChannelId, threadscribe_ledger::AuthorLedger};

use crate::{
    client::{EventReceiver, ForumClient, GatewayEvent, PostDescriptor},
    record::PostRecorder,
};

/// Watches the gateway event stream for posts created in the target channel.
pub struct LiveMonitor {
    recorder: Arc<PostRecorder>,
    channel_id: ChannelId,
}

impl LiveMonitor {
    pub fn new(
        client: Arc<dyn ForumClient>,
        ledger: Arc<AuthorLedger>,
        channel_id: ChannelId,
    ) -> Self {
        Self {
            recorder: Arc::new(PostRecorder { client, ledger }),
            channel_id,
        }
    }

    /// Consume events until the stream closes or `cancel` fires.
    ///
    /// Each post notification is handled in its own task, so a slow or
    /// failing retrieval never delays unrelated notifications. In-flight
    /// handlers are drained before this returns, which keeps them ahead of
    /// the shutdown flush.
    pub async fn run(&self, mut events: EventReceiver, cancel: CancellationToken) {
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("live monitoring stopping");
                    break;
                },
                Some(_) = handlers.join_next(), if !handlers.is_empty() => {},
                event = events.recv() => match event {
                    Some(GatewayEvent::Ready { bot_name }) => {
                        info!(bot = %bot_name, "gateway connected, monitoring for new posts");
                    },
                    Some(GatewayEvent::PostCreated(post)) => {
                        self.dispatch(post, &mut handlers);
                    },
                    Some(GatewayEvent::Fault { message }) => {
                        warn!(fault = %message, "gateway transport fault");
                    },
                    None => {
                        warn!("gateway event stream closed");
                        break;
                    },
                },
            }
        }

        while handlers.join_next().await.is_some() {}
    }

    fn dispatch(&self, post: PostDescriptor, handlers: &mut JoinSet<()>) {
        if post.parent_channel_id != self.channel_id {
            debug!(
                thread_id = %post.thread_id,
                channel_id = %post.parent_channel_id,
                "ignoring post outside target channel"
            );
            return;
        }

        let recorder = Arc::clone(&self.recorder);
        handlers.spawn(async move {
            match recorder.record(&post).await {
                Ok(true) => info!(title = %post.title, "new forum post recorded"),
                Ok(false) => debug!(title = %post.title, "post author already known"),
                Err(e) => {
                    warn!(thread_id = %post.thread_id, error = %e, "failed to handle new post");
                },
            }
        });
    }
}

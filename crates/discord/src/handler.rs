//! Discord gateway event handler.
//!
//! Translates serenity gateway events into tracker `GatewayEvent`s; all
//! filtering and author resolution happens on the consumer side.

use {
    serenity::{
        all::{Context, EventHandler, GatewayIntents, GuildChannel, Ready},
        async_trait,
    },
    tracing::{debug, info, warn},
};

use threadscribe_tracker::client::{EventSender, GatewayEvent};

use crate::client::post_from_thread;

/// Forwards gateway events into the tracker's event channel.
pub struct Handler {
    events: EventSender,
}

impl Handler {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Gateway intents the tracker needs.
    #[must_use]
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    async fn forward(&self, event: GatewayEvent) {
        if self.events.send(event).await.is_err() {
            warn!("event channel closed, dropping gateway event");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(bot_name = %ready.user.name, guilds = ready.guilds.len(), "discord bot ready");
        self.forward(GatewayEvent::Ready {
            bot_name: ready.user.name.clone(),
        })
        .await;
    }

    async fn thread_create(&self, _ctx: Context, thread: GuildChannel) {
        let Some(post) = post_from_thread(&thread) else {
            debug!(thread_id = %thread.id, "ignoring thread without a parent channel");
            return;
        };
        debug!(thread_id = %post.thread_id, title = %post.title, "thread created");
        self.forward(GatewayEvent::PostCreated(post)).await;
    }
}

//! Collaborator seam to the chat platform.
//!
//! The engine never talks to a platform SDK directly; channel verification,
//! post enumeration, starter-message fetches, and the live event stream all
//! come through these types. Gateway adapters implement [`ForumClient`] and
//! push [`GatewayEvent`]s into an mpsc channel.

use async_trait::async_trait;

use threadscribe_common::{AuthorId, ChannelId, GuildId, Result, ThreadId};

/// A forum post (thread) as seen through enumeration or a creation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDescriptor {
    pub thread_id: ThreadId,
    pub parent_channel_id: ChannelId,
    pub title: String,
    /// Starter author, when the platform attributes posts at enumeration
    /// time (Discord exposes the thread owner). Used as a fallback when the
    /// starter message itself carries no attributable author.
    pub starter_author_id: Option<AuthorId>,
}

/// Resolved originating message of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterMessage {
    pub author_id: AuthorId,
    pub author_name: String,
}

/// Target forum channel, as confirmed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumChannel {
    pub channel_id: ChannelId,
    pub name: String,
}

/// Platform operations the engine consumes.
#[async_trait]
pub trait ForumClient: Send + Sync {
    /// Check that `guild_id` exists, that `channel_id` exists within it, and
    /// that the channel is a forum. A failure here aborts a reconciliation
    /// pass.
    async fn verify_forum(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<ForumChannel>;

    /// List the currently active posts in a channel.
    async fn active_posts(&self, channel_id: ChannelId) -> Result<Vec<PostDescriptor>>;

    /// List the archived posts in a channel, exhaustively.
    async fn archived_posts(&self, channel_id: ChannelId) -> Result<Vec<PostDescriptor>>;

    /// Fetch the starter message of a post.
    ///
    /// `Ok(None)` means the message was found but carries no attributable
    /// author; an error means the message could not be retrieved at all
    /// (deleted, missing permission, network failure).
    async fn starter_message(&self, thread_id: ThreadId) -> Result<Option<StarterMessage>>;
}

/// Notifications pushed by the platform gateway connection.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// Connection established and identified.
    Ready { bot_name: String },
    /// A new post was created somewhere on the platform.
    PostCreated(PostDescriptor),
    /// The underlying connection reported an unexpected fault.
    Fault { message: String },
}

/// Receiver half of the gateway event stream.
pub type EventReceiver = tokio::sync::mpsc::Receiver<GatewayEvent>;

/// Sender half of the gateway event stream.
pub type EventSender = tokio::sync::mpsc::Sender<GatewayEvent>;

//! Forum operations over the Discord HTTP API.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serenity::{
        all::{ChannelType, GuildChannel, MessageId},
        http::{Http, HttpError},
        model::id::{ChannelId as DiscordChannelId, GuildId as DiscordGuildId},
    },
    tracing::debug,
};

use {
    threadscribe_common::{AuthorId, ChannelId, Error, GuildId, Result, ThreadId},
    threadscribe_tracker::client::{ForumChannel, ForumClient, PostDescriptor, StarterMessage},
};

/// Page size for archived-thread listing (the API maximum).
const ARCHIVED_PAGE_SIZE: u64 = 100;

/// `ForumClient` backed by serenity's HTTP client.
#[derive(Clone)]
pub struct DiscordClient {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordClient {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

/// Map a thread object onto a post descriptor. Threads without a parent
/// channel (which forum posts always have) are skipped.
pub(crate) fn post_from_thread(thread: &GuildChannel) -> Option<PostDescriptor> {
    let parent = thread.parent_id?;
    Some(PostDescriptor {
        thread_id: ThreadId(thread.id.get()),
        parent_channel_id: ChannelId(parent.get()),
        title: thread.name.clone(),
        starter_author_id: thread.owner_id.map(|owner| AuthorId::new(owner.to_string())),
    })
}

fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

fn lookup_error(error: serenity::Error, what: &'static str, id: impl std::fmt::Display) -> Error {
    if is_not_found(&error) {
        Error::not_found(what, id)
    } else {
        Error::transport(format!("{what} lookup failed: {error}"))
    }
}

#[async_trait]
impl ForumClient for DiscordClient {
    async fn verify_forum(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<ForumChannel> {
        let guild = self
            .http
            .get_guild(DiscordGuildId::new(guild_id.get()))
            .await
            .map_err(|e| lookup_error(e, "guild", guild_id))?;

        let channel = self
            .http
            .get_channel(DiscordChannelId::new(channel_id.get()))
            .await
            .map_err(|e| lookup_error(e, "channel", channel_id))?;

        let Some(channel) = channel.guild() else {
            return Err(Error::not_forum(channel_id));
        };
        if channel.guild_id != guild.id {
            return Err(Error::not_found("channel", channel_id));
        }
        if channel.kind != ChannelType::Forum {
            return Err(Error::not_forum(channel_id));
        }

        Ok(ForumChannel {
            channel_id,
            name: channel.name,
        })
    }

    async fn active_posts(&self, channel_id: ChannelId) -> Result<Vec<PostDescriptor>> {
        let data = self
            .http
            .get_guild_active_threads(DiscordGuildId::new(self.guild_id.get()))
            .await
            .map_err(|e| Error::transport(format!("active thread listing failed: {e}")))?;

        Ok(data
            .threads
            .iter()
            .filter(|thread| thread.parent_id.is_some_and(|p| p.get() == channel_id.get()))
            .filter_map(post_from_thread)
            .collect())
    }

    async fn archived_posts(&self, channel_id: ChannelId) -> Result<Vec<PostDescriptor>> {
        let channel = DiscordChannelId::new(channel_id.get());
        let mut posts = Vec::new();
        let mut before: Option<u64> = None;

        loop {
            let page = self
                .http
                .get_channel_archived_public_threads(channel, before, Some(ARCHIVED_PAGE_SIZE))
                .await
                .map_err(|e| Error::transport(format!("archived thread listing failed: {e}")))?;

            posts.extend(page.threads.iter().filter_map(post_from_thread));

            if !page.has_more {
                break;
            }
            // Page on the oldest archive timestamp seen so far.
            let cursor = page
                .threads
                .iter()
                .filter_map(|t| t.thread_metadata.as_ref().and_then(|m| m.archive_timestamp))
                .map(|ts| ts.unix_timestamp())
                .min();
            match cursor {
                Some(ts) => before = Some(ts as u64),
                None => break,
            }
        }

        debug!(channel_id = %channel_id, count = posts.len(), "listed archived posts");
        Ok(posts)
    }

    async fn starter_message(&self, thread_id: ThreadId) -> Result<Option<StarterMessage>> {
        // A forum post's starter message shares the post's id.
        let message = self
            .http
            .get_message(
                DiscordChannelId::new(thread_id.get()),
                MessageId::new(thread_id.get()),
            )
            .await
            .map_err(|e| Error::retrieval(thread_id, e))?;

        let author = &message.author;
        Ok(Some(StarterMessage {
            author_id: AuthorId::new(author.id.to_string()),
            author_name: author
                .global_name
                .clone()
                .unwrap_or_else(|| author.name.clone()),
        }))
    }
}

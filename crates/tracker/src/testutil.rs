//! In-memory fakes shared by the engine tests.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use {
    threadscribe_common::{AuthorId, ChannelId, Error, GuildId, Result, ThreadId},
    threadscribe_ledger::{AuthorLedger, MemoryStore},
};

use crate::client::{ForumChannel, ForumClient, PostDescriptor, StarterMessage};

/// Ledger backed by an in-memory store.
pub(crate) fn ledger() -> Arc<AuthorLedger> {
    Arc::new(AuthorLedger::new(Arc::new(MemoryStore::new())))
}

/// Descriptor for a post as a creation event would carry it.
pub(crate) fn event_post(thread: u64, channel: ChannelId, title: &str) -> PostDescriptor {
    PostDescriptor {
        thread_id: ThreadId(thread),
        parent_channel_id: channel,
        title: title.to_string(),
        starter_author_id: None,
    }
}

/// Scriptable `ForumClient` double.
pub(crate) struct FakeForum {
    guild_id: GuildId,
    channel: ForumChannel,
    is_forum: bool,
    active: Vec<PostDescriptor>,
    archived: Vec<PostDescriptor>,
    starters: HashMap<ThreadId, StarterMessage>,
    failing: HashSet<ThreadId>,
    unattributed: HashSet<ThreadId>,
    fetches: AtomicUsize,
}

impl FakeForum {
    pub(crate) fn new(guild_id: GuildId, channel_id: ChannelId) -> Self {
        Self {
            guild_id,
            channel: ForumChannel {
                channel_id,
                name: "support-forum".into(),
            },
            is_forum: true,
            active: Vec::new(),
            archived: Vec::new(),
            starters: HashMap::new(),
            failing: HashSet::new(),
            unattributed: HashSet::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub(crate) fn not_a_forum(mut self) -> Self {
        self.is_forum = false;
        self
    }

    pub(crate) fn with_active_post(mut self, thread: u64, title: &str, author: &str) -> Self {
        let post = self.make_post(thread, title, author);
        self.active.push(post);
        self
    }

    pub(crate) fn with_archived_post(mut self, thread: u64, title: &str, author: &str) -> Self {
        let post = self.make_post(thread, title, author);
        self.archived.push(post);
        self
    }

    /// Register a starter message without listing the post anywhere, for
    /// threads that only ever arrive as live events.
    pub(crate) fn with_starter(mut self, thread: u64, author: &str) -> Self {
        self.starters.insert(
            ThreadId(thread),
            StarterMessage {
                author_id: AuthorId::new(author),
                author_name: format!("{author}-name"),
            },
        );
        self
    }

    /// Make starter retrieval for `thread` fail.
    pub(crate) fn with_failing_starter(mut self, thread: u64) -> Self {
        self.failing.insert(ThreadId(thread));
        self
    }

    /// Make `thread`'s starter message resolve without an author.
    pub(crate) fn with_unattributed_starter(mut self, thread: u64) -> Self {
        self.unattributed.insert(ThreadId(thread));
        self
    }

    pub(crate) fn starter_fetches(&self) -> usize {
        self.fetches.load(Ordering::Acquire)
    }

    fn make_post(&mut self, thread: u64, title: &str, author: &str) -> PostDescriptor {
        self.starters.insert(
            ThreadId(thread),
            StarterMessage {
                author_id: AuthorId::new(author),
                author_name: format!("{author}-name"),
            },
        );
        PostDescriptor {
            thread_id: ThreadId(thread),
            parent_channel_id: self.channel.channel_id,
            title: title.to_string(),
            starter_author_id: Some(AuthorId::new(author)),
        }
    }
}

#[async_trait]
impl ForumClient for FakeForum {
    async fn verify_forum(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<ForumChannel> {
        if guild_id != self.guild_id {
            return Err(Error::not_found("guild", guild_id));
        }
        if channel_id != self.channel.channel_id {
            return Err(Error::not_found("channel", channel_id));
        }
        if !self.is_forum {
            return Err(Error::not_forum(channel_id));
        }
        Ok(self.channel.clone())
    }

    async fn active_posts(&self, _channel_id: ChannelId) -> Result<Vec<PostDescriptor>> {
        Ok(self.active.clone())
    }

    async fn archived_posts(&self, _channel_id: ChannelId) -> Result<Vec<PostDescriptor>> {
        Ok(self.archived.clone())
    }

    async fn starter_message(&self, thread_id: ThreadId) -> Result<Option<StarterMessage>> {
        self.fetches.fetch_add(1, Ordering::AcqRel);
        if self.failing.contains(&thread_id) {
            return Err(Error::retrieval(thread_id, "retrieval disabled"));
        }
        if self.unattributed.contains(&thread_id) {
            return Ok(None);
        }
        match self.starters.get(&thread_id) {
            Some(starter) => Ok(Some(starter.clone())),
            None => Err(Error::retrieval(thread_id, "no such message")),
        }
    }
}

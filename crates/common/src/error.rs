use std::{error::Error as StdError, path::PathBuf};

use crate::types::{ChannelId, ThreadId};

/// Crate-wide result type for tracking operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared across the tracking pipeline.
///
/// Everything except a failed shutdown flush is isolated to the operation
/// that produced it: lookup failures abort one reconciliation pass,
/// retrieval failures skip one post, persistence failures leave the
/// in-memory set authoritative, and transport faults are logged and ignored.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A guild or channel lookup came back empty.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// The target channel exists but is not a forum channel.
    #[error("channel {channel_id} is not a forum channel")]
    NotForum { channel_id: ChannelId },

    /// A single post's starter message could not be retrieved.
    #[error("failed to retrieve starter message for post {thread_id}: {reason}")]
    Retrieval { thread_id: ThreadId, reason: String },

    /// The snapshot file could not be read or written.
    #[error("persistence failed for {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Unexpected fault from the platform connection.
    #[error("gateway transport fault: {message}")]
    Transport { message: String },
}

impl Error {
    #[must_use]
    pub fn not_found(what: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn not_forum(channel_id: ChannelId) -> Self {
        Self::NotForum { channel_id }
    }

    #[must_use]
    pub fn retrieval(thread_id: ThreadId, reason: impl std::fmt::Display) -> Self {
        Self::Retrieval {
            thread_id,
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

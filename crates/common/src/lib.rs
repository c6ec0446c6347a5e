//! Shared identifier types and error definitions used across all
//! threadscribe crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, Result},
    types::{AuthorId, ChannelId, GuildId, ThreadId},
};

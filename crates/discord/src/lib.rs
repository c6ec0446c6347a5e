//! Discord adapter for the post-author tracker.
//!
//! Implements the tracker's `ForumClient` seam over serenity's HTTP API and
//! forwards gateway events into the tracker's event channel.

pub mod client;
pub mod config;
pub mod gateway;
pub mod handler;

pub use {
    client::DiscordClient, config::DiscordConfig, gateway::DiscordGateway, handler::Handler,
};

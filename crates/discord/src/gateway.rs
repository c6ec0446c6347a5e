//! Gateway connection lifecycle.

use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    serenity::{Client, gateway::ShardManager},
    tokio::sync::mpsc,
    tracing::{error, info},
};

use {
    threadscribe_common::{Error, Result},
    threadscribe_tracker::client::{EventReceiver, GatewayEvent},
};

use crate::{client::DiscordClient, config::DiscordConfig, handler::Handler};

/// Buffered gateway events; posts created during reconciliation queue here
/// until the monitor starts draining.
const EVENT_BUFFER: usize = 256;

/// A running Discord gateway connection.
pub struct DiscordGateway {
    client: DiscordClient,
    shard_manager: Arc<ShardManager>,
}

impl DiscordGateway {
    /// Connect to Discord and start the gateway in a background task.
    ///
    /// Returns the connection handle and the receiver carrying its events.
    /// A gateway run-loop failure surfaces as a `Fault` event rather than
    /// tearing the process down.
    pub async fn connect(config: &DiscordConfig) -> Result<(Self, EventReceiver)> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let mut client = Client::builder(config.token.expose_secret(), Handler::intents())
            .event_handler(Handler::new(tx.clone()))
            .await
            .map_err(|e| Error::transport(format!("discord client build failed: {e}")))?;

        let forum_client = DiscordClient::new(Arc::clone(&client.http), config.guild_id);
        let shard_manager = Arc::clone(&client.shard_manager);

        tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!(error = %e, "discord gateway stopped unexpectedly");
                let _ = tx
                    .send(GatewayEvent::Fault {
                        message: e.to_string(),
                    })
                    .await;
            }
        });

        info!(guild_id = %config.guild_id, "discord gateway starting");
        Ok((
            Self {
                client: forum_client,
                shard_manager,
            },
            rx,
        ))
    }

    /// HTTP-side client for enumeration and message fetches.
    #[must_use]
    pub fn client(&self) -> DiscordClient {
        self.client.clone()
    }

    /// Detach from the event stream and stop the gateway shards.
    pub async fn disconnect(&self) {
        info!("disconnecting from the discord gateway");
        self.shard_manager.shutdown_all().await;
    }
}

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::Parser,
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::EnvFilter,
};

use {
    threadscribe_common::{ChannelId, GuildId},
    threadscribe_discord::{DiscordConfig, DiscordGateway},
    threadscribe_ledger::{AuthorLedger, FileStore},
    threadscribe_tracker::TrackerService,
};

#[derive(Parser)]
#[command(
    name = "threadscribe",
    about = "Tracks distinct post authors in a Discord forum channel"
)]
struct Cli {
    /// Bot token.
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    token: String,

    /// Guild (server) id that owns the forum channel.
    #[arg(long, env = "GUILD_ID")]
    guild_id: u64,

    /// Forum channel id whose posts are tracked.
    #[arg(long, env = "FORUM_CHANNEL_ID")]
    forum_channel_id: u64,

    /// Path of the persisted author-set file.
    #[arg(long, env = "LOG_FILE", default_value = "authors.json")]
    state_file: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs)?;

    anyhow::ensure!(cli.guild_id != 0, "GUILD_ID must be a valid guild id");
    anyhow::ensure!(
        cli.forum_channel_id != 0,
        "FORUM_CHANNEL_ID must be a valid channel id"
    );

    let config = DiscordConfig {
        token: Secret::new(cli.token),
        guild_id: GuildId(cli.guild_id),
        forum_channel_id: ChannelId(cli.forum_channel_id),
    };

    let store = Arc::new(FileStore::new(cli.state_file));
    let ledger = Arc::new(AuthorLedger::new(store));

    let (gateway, events) = DiscordGateway::connect(&config)
        .await
        .context("failed to connect to the discord gateway")?;

    let service = TrackerService::new(
        Arc::new(gateway.client()),
        Arc::clone(&ledger),
        config.guild_id,
        config.forum_channel_id,
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for the shutdown signal");
                return;
            }
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    let result = service.run(events, shutdown).await;
    gateway.disconnect().await;

    result.context("final state flush failed")?;
    info!("shut down cleanly");
    Ok(())
}

fn init_tracing(level: &str, json_logs: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use threadscribe_common::{ChannelId, GuildId};

/// Connection settings for the Discord gateway.
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Guild (server) that owns the forum channel.
    pub guild_id: GuildId,

    /// Forum channel whose posts are tracked.
    pub forum_channel_id: ChannelId,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("guild_id", &self.guild_id)
            .field("forum_channel_id", &self.forum_channel_id)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

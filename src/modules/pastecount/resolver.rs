use crate::platform::{ChannelSummary, GuildPlatform, PlatformError};
use poise::serenity_prelude::{
    ChannelId, ChannelType, GuildId, PermissionOverwrite, PermissionOverwriteType, Permissions,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const CHANNEL_PREFIX: &str = "Paste Count:";

pub fn channel_name(count: u64) -> String {
    format!("{} {}", CHANNEL_PREFIX, count)
}

fn is_paste_count_channel(channel: &ChannelSummary) -> bool {
    channel.kind == ChannelType::Voice && channel.name.starts_with(CHANNEL_PREFIX)
}

/// Nobody but the bot may connect; the channel is only a label.
pub fn connect_overwrites(
    guild_id: GuildId,
    platform: &dyn GuildPlatform,
) -> Vec<PermissionOverwrite> {
    vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::CONNECT,
            kind: PermissionOverwriteType::Role(guild_id.everyone_role()),
        },
        PermissionOverwrite {
            allow: Permissions::CONNECT,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(platform.bot_id()),
        },
    ]
}

/// Finds or creates the paste count channel of a guild.
///
/// Channel ids resolved during this process lifetime are remembered, so a
/// channel renamed by someone else is still picked up. Without a remembered
/// id the first voice channel whose name starts with [`CHANNEL_PREFIX`] wins.
///
/// Resolutions are serialized: the lock is held from the scan until the
/// resolved id is stored, so overlapping updates never create two channels.
#[derive(Debug, Default)]
pub struct ChannelResolver {
    remembered: Mutex<HashMap<GuildId, ChannelId>>,
}

impl ChannelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve_channel(
        &self,
        platform: &dyn GuildPlatform,
        guild_id: GuildId,
    ) -> Result<ChannelSummary, PlatformError> {
        let mut remembered_ids = self.remembered.lock().await;
        let channels = platform.channels(guild_id).await?;
        let remembered = remembered_ids.get(&guild_id).copied();

        let existing = remembered
            .and_then(|id| {
                channels
                    .iter()
                    .find(|c| c.id == id && c.kind == ChannelType::Voice)
            })
            .or_else(|| channels.iter().find(|c| is_paste_count_channel(c)));

        let channel = match existing {
            Some(channel) => {
                debug!("Found paste count channel {} in {}", channel.id, guild_id);
                channel.clone()
            }
            None => {
                let channel = platform
                    .create_voice_channel(
                        guild_id,
                        &channel_name(0),
                        connect_overwrites(guild_id, platform),
                    )
                    .await?;
                info!("Created paste count channel {} in {}", channel.id, guild_id);
                channel
            }
        };

        remembered_ids.insert(guild_id, channel.id);
        Ok(channel)
    }
}

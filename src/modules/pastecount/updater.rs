use super::fetcher::{FetchError, PasteCountSource};
use super::resolver::{channel_name, ChannelResolver};
use crate::platform::{ChannelSummary, GuildPlatform, PlatformError};
use poise::serenity_prelude::GuildId;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Renames `channel` to show `count`. Returns whether a rename was issued.
pub async fn apply_count(
    platform: &dyn GuildPlatform,
    channel: &ChannelSummary,
    count: u64,
) -> Result<bool, PlatformError> {
    let new_name = channel_name(count);
    if channel.name == new_name {
        debug!("Skipping update for {} - name unchanged", channel.id);
        return Ok(false);
    }

    platform.rename_channel(channel.id, &new_name).await?;
    debug!("Updated channel {} to \"{}\"", channel.id, new_name);
    Ok(true)
}

/// Resolves the guild's channel, fetches a fresh count and writes it.
pub async fn update_channel(
    platform: &dyn GuildPlatform,
    resolver: &ChannelResolver,
    source: &dyn PasteCountSource,
    guild_id: GuildId,
) -> Result<u64, UpdateError> {
    let channel = resolver.resolve_channel(platform, guild_id).await?;
    let count = source.fetch_paste_count().await?;
    apply_count(platform, &channel, count).await?;
    Ok(count)
}

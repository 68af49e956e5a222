use async_trait::async_trait;
use poise::serenity_prelude::{
    self as serenity, ChannelId, ChannelType, Context, CreateChannel, EditChannel, GuildId,
    GuildPagination, Http, PermissionOverwrite, UserId,
};
use std::sync::Arc;
use thiserror::Error;

/// Discord caps the current-user guild listing at 200 per page.
const GUILDS_PER_PAGE: u64 = 200;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSummary {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelType,
}

/// The subset of the Discord API the bot touches.
#[async_trait]
pub trait GuildPlatform: Send + Sync {
    /// User id of the logged-in bot.
    fn bot_id(&self) -> UserId;

    async fn guilds(&self) -> Result<Vec<GuildSummary>, PlatformError>;

    async fn channels(&self, guild_id: GuildId) -> Result<Vec<ChannelSummary>, PlatformError>;

    async fn create_voice_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelSummary, PlatformError>;

    async fn rename_channel(&self, channel_id: ChannelId, name: &str) -> Result<(), PlatformError>;
}

#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    bot_id: UserId,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, bot_id: UserId) -> Self {
        Self { http, bot_id }
    }

    pub fn from_context(ctx: &Context) -> Self {
        let bot_id = ctx.cache.current_user().id;
        Self::new(ctx.http.clone(), bot_id)
    }
}

#[async_trait]
impl GuildPlatform for SerenityPlatform {
    fn bot_id(&self) -> UserId {
        self.bot_id
    }

    async fn guilds(&self) -> Result<Vec<GuildSummary>, PlatformError> {
        let mut guilds = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .http
                .get_guilds(after.map(GuildPagination::After), Some(GUILDS_PER_PAGE))
                .await?;
            let page_len = page.len() as u64;
            after = page.last().map(|g| g.id);

            guilds.extend(page.into_iter().map(|g| GuildSummary {
                id: g.id,
                name: g.name,
            }));

            if page_len < GUILDS_PER_PAGE {
                break;
            }
        }

        Ok(guilds)
    }

    async fn channels(&self, guild_id: GuildId) -> Result<Vec<ChannelSummary>, PlatformError> {
        let channels = self.http.get_channels(guild_id).await?;
        Ok(channels
            .into_iter()
            .map(|c| ChannelSummary {
                id: c.id,
                name: c.name,
                kind: c.kind,
            })
            .collect())
    }

    async fn create_voice_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelSummary, PlatformError> {
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Voice)
            .permissions(overwrites);

        let channel = guild_id.create_channel(&self.http, builder).await?;
        Ok(ChannelSummary {
            id: channel.id,
            name: channel.name,
            kind: channel.kind,
        })
    }

    async fn rename_channel(&self, channel_id: ChannelId, name: &str) -> Result<(), PlatformError> {
        channel_id
            .edit(&self.http, EditChannel::new().name(name))
            .await?;
        Ok(())
    }
}

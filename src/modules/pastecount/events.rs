use super::updater::update_channel;
use super::PasteCountService;
use crate::events::EventHandler;
use crate::platform::{GuildPlatform, SerenityPlatform};
use async_trait::async_trait;
use poise::serenity_prelude::{Context, FullEvent, Guild, GuildId};
use std::sync::Arc;
use tracing::{error, info};

/// The guild carried by a `GuildCreate` for a guild the bot has just joined.
///
/// Guilds that were already joined also arrive as `GuildCreate` on startup,
/// with `is_new` unset or false.
pub fn joined_guild(event: &FullEvent) -> Option<&Guild> {
    match event {
        FullEvent::GuildCreate {
            guild,
            is_new: Some(true),
        } => Some(guild),
        _ => None,
    }
}

/// Updates a freshly joined guild. Failures are logged, never returned.
pub async fn on_guild_joined(
    platform: &dyn GuildPlatform,
    service: &PasteCountService,
    guild_id: GuildId,
    guild_name: &str,
) -> Option<u64> {
    info!("Joined guild: {} ({})", guild_name, guild_id);

    match update_channel(
        platform,
        &service.resolver,
        service.source.as_ref(),
        guild_id,
    )
    .await
    {
        Ok(count) => Some(count),
        Err(e) => {
            error!("Error updating paste count channel in {}: {}", guild_id, e);
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuildJoinHandler {
    service: Arc<PasteCountService>,
}

impl GuildJoinHandler {
    pub fn new(service: Arc<PasteCountService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler for GuildJoinHandler {
    fn name(&self) -> &str {
        "GuildJoin"
    }

    async fn handle(
        &self,
        ctx: &Context,
        event: &FullEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(guild) = joined_guild(event) {
            let platform = SerenityPlatform::from_context(ctx);
            on_guild_joined(&platform, &self.service, guild.id, &guild.name).await;
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn EventHandler> {
        Box::new(self.clone())
    }
}

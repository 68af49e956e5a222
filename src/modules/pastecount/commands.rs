use super::fetcher::PasteCountSource;
use super::updater::update_channel;
use crate::platform::SerenityPlatform;
use crate::{Context, Error};
use tracing::error;

/// Update this server's paste count channel now
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_CHANNELS")]
pub async fn refresh(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    ctx.defer_ephemeral().await?;

    let service = &ctx.data().paste_count;
    let platform = SerenityPlatform::from_context(ctx.serenity_context());

    match update_channel(&platform, &service.resolver, service.source.as_ref(), guild_id).await {
        Ok(count) => {
            ctx.say(format!("✅ Paste count channel updated: **{}** pastes", count))
                .await?;
        }
        Err(e) => {
            error!("Manual paste count refresh failed in {}: {}", guild_id, e);
            ctx.say(format!("❌ Failed to update the paste count channel: {}", e))
                .await?;
        }
    }

    Ok(())
}

/// Show the current paste count
#[poise::command(slash_command)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let count = ctx.data().paste_count.source.fetch_paste_count().await?;
    ctx.say(format!("📋 There are currently **{}** pastes", count))
        .await?;
    Ok(())
}

pub mod commands;
pub mod events;
pub mod fetcher;
pub mod resolver;
pub mod task;
pub mod updater;

use commands::*;
use fetcher::PasteCountSource;
use poise::command;
use resolver::ChannelResolver;
use std::sync::Arc;

/// Everything needed to put a paste count into a guild, shared by the sweep
/// task, the guild join handler and the commands.
pub struct PasteCountService {
    pub resolver: ChannelResolver,
    pub source: Arc<dyn PasteCountSource>,
}

impl PasteCountService {
    pub fn new(source: Arc<dyn PasteCountSource>) -> Self {
        Self {
            resolver: ChannelResolver::new(),
            source,
        }
    }
}

impl std::fmt::Debug for PasteCountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteCountService")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// 📋 Paste count channel
#[command(slash_command, subcommands("refresh", "show"), guild_only)]
pub async fn pastecount(_ctx: crate::Context<'_>) -> Result<(), crate::Error> {
    Ok(())
}

//! In-memory stand-ins for Discord and the paste API.

use crate::modules::pastecount::fetcher::{FetchError, PasteCountSource};
use crate::platform::{ChannelSummary, GuildPlatform, GuildSummary, PlatformError};
use async_trait::async_trait;
use poise::serenity_prelude::{
    self as serenity, ChannelId, ChannelType, GuildId, PermissionOverwrite, UserId,
};
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BOT_ID: u64 = 999;

#[derive(Debug, Clone)]
pub struct CreatedChannel {
    pub guild_id: GuildId,
    pub name: String,
    pub overwrites: Vec<PermissionOverwrite>,
}

#[derive(Default)]
struct FakeState {
    guilds: Vec<GuildSummary>,
    channels: HashMap<GuildId, Vec<ChannelSummary>>,
    created: Vec<CreatedChannel>,
    renames: Vec<(ChannelId, String)>,
    failing_renames: HashSet<GuildId>,
    failing_listings: HashSet<GuildId>,
    fail_guild_listing: bool,
    next_id: u64,
}

pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 10_000,
                ..Default::default()
            }),
        }
    }

    pub fn add_guild(&self, id: u64, name: &str) -> GuildId {
        let guild_id = GuildId::new(id);
        let mut state = self.state.lock().unwrap();
        state.guilds.push(GuildSummary {
            id: guild_id,
            name: name.to_string(),
        });
        state.channels.entry(guild_id).or_default();
        guild_id
    }

    pub fn add_channel(&self, guild_id: GuildId, name: &str, kind: ChannelType) -> ChannelId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = ChannelId::new(state.next_id);
        state.channels.entry(guild_id).or_default().push(ChannelSummary {
            id,
            name: name.to_string(),
            kind,
        });
        id
    }

    pub fn fail_renames_in(&self, guild_id: GuildId) {
        self.state.lock().unwrap().failing_renames.insert(guild_id);
    }

    pub fn fail_channel_listing_in(&self, guild_id: GuildId) {
        self.state.lock().unwrap().failing_listings.insert(guild_id);
    }

    pub fn fail_guild_listing(&self) {
        self.state.lock().unwrap().fail_guild_listing = true;
    }

    pub fn channels_of(&self, guild_id: GuildId) -> Vec<ChannelSummary> {
        self.state
            .lock()
            .unwrap()
            .channels
            .get(&guild_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn created(&self) -> Vec<CreatedChannel> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn renames(&self) -> Vec<(ChannelId, String)> {
        self.state.lock().unwrap().renames.clone()
    }
}

#[async_trait]
impl GuildPlatform for FakePlatform {
    fn bot_id(&self) -> UserId {
        UserId::new(BOT_ID)
    }

    async fn guilds(&self) -> Result<Vec<GuildSummary>, PlatformError> {
        let state = self.state.lock().unwrap();
        if state.fail_guild_listing {
            return Err(serenity::Error::Other("guild listing failed").into());
        }
        Ok(state.guilds.clone())
    }

    async fn channels(&self, guild_id: GuildId) -> Result<Vec<ChannelSummary>, PlatformError> {
        // Suspend like a real request so concurrent callers can interleave.
        tokio::task::yield_now().await;
        let state = self.state.lock().unwrap();
        if state.failing_listings.contains(&guild_id) {
            return Err(serenity::Error::Other("channel listing failed").into());
        }
        Ok(state.channels.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn create_voice_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelSummary, PlatformError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let channel = ChannelSummary {
            id: ChannelId::new(state.next_id),
            name: name.to_string(),
            kind: ChannelType::Voice,
        };
        state
            .channels
            .entry(guild_id)
            .or_default()
            .push(channel.clone());
        state.created.push(CreatedChannel {
            guild_id,
            name: name.to_string(),
            overwrites,
        });
        Ok(channel)
    }

    async fn rename_channel(&self, channel_id: ChannelId, name: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        let FakeState {
            channels,
            renames,
            failing_renames,
            ..
        } = &mut *state;

        let (guild_id, channel) = channels
            .iter_mut()
            .find_map(|(guild_id, list)| {
                list.iter_mut()
                    .find(|c| c.id == channel_id)
                    .map(|c| (*guild_id, c))
            })
            .ok_or(serenity::Error::Other("unknown channel"))?;

        if failing_renames.contains(&guild_id) {
            return Err(serenity::Error::Other("rename failed").into());
        }

        channel.name = name.to_string();
        renames.push((channel_id, name.to_string()));
        Ok(())
    }
}

/// Paste source that returns a fixed value, or fails when built with `failing`.
pub struct FixedCount {
    count: Option<u64>,
    calls: AtomicUsize,
}

impl FixedCount {
    pub fn new(count: u64) -> Self {
        Self {
            count: Some(count),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            count: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasteCountSource for FixedCount {
    async fn fetch_paste_count(&self) -> Result<u64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.count
            .ok_or(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE))
    }
}

use super::fetcher::{FetchError, PasteCountSource};
use super::updater::apply_count;
use super::PasteCountService;
use crate::platform::{GuildPlatform, PlatformError, SerenityPlatform};
use crate::tasks::Task;
use async_trait::async_trait;
use poise::serenity_prelude::Context;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Failed to list guilds: {0}")]
    Guilds(#[source] PlatformError),
    #[error(transparent)]
    Count(#[from] FetchError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub count: u64,
    pub updated: usize,
    pub failed: usize,
}

/// Writes one freshly fetched count into every joined guild.
///
/// The count is fetched once; if that fails nothing is touched. A failure in
/// one guild is logged and the remaining guilds are still processed.
pub async fn sweep(
    platform: &dyn GuildPlatform,
    service: &PasteCountService,
) -> Result<SweepReport, SweepError> {
    let guilds = platform.guilds().await.map_err(SweepError::Guilds)?;
    let count = service.source.fetch_paste_count().await?;
    debug!("Sweeping {} guilds with count {}", guilds.len(), count);

    let mut report = SweepReport {
        count,
        ..Default::default()
    };

    for guild in guilds {
        let result = async {
            let channel = service.resolver.resolve_channel(platform, guild.id).await?;
            apply_count(platform, &channel, count).await
        }
        .await;

        match result {
            Ok(_) => report.updated += 1,
            Err(e) => {
                error!(
                    "Failed to update paste count channel in {} ({}): {}",
                    guild.name, guild.id, e
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

pub struct PasteCountTask {
    service: Arc<PasteCountService>,
    interval: Duration,
}

impl PasteCountTask {
    pub fn new(service: Arc<PasteCountService>, interval: Duration) -> Self {
        Self { service, interval }
    }
}

#[async_trait]
impl Task for PasteCountTask {
    fn name(&self) -> &str {
        "PasteCountSweep"
    }

    fn schedule(&self) -> Option<Duration> {
        Some(self.interval)
    }

    async fn execute(
        &mut self,
        ctx: &Context,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let start = std::time::Instant::now();
        info!("Starting paste count sweep");

        let platform = SerenityPlatform::from_context(ctx);
        let report = sweep(&platform, &self.service).await?;

        info!(
            "Paste count sweep completed in {:?}: count {}, {} updated, {} failed",
            start.elapsed(),
            report.count,
            report.updated,
            report.failed
        );
        Ok(())
    }
}

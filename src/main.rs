use config::{Config, ConfigError};
use modules::{
    pastecount::{
        events::GuildJoinHandler, fetcher::PasteCountClient, pastecount, task::PasteCountTask,
        PasteCountService,
    },
    system::events::ReadyHandler,
};
use poise::serenity_prelude::{self as serenity, CreateAllowedMentions};
use std::sync::Arc;
use tasks::TaskManager;
use thiserror::Error;
use tracing::{error, info, trace};
use tracing_subscriber::EnvFilter;

mod config;
mod events;
mod modules;
mod platform;
mod tasks;
#[cfg(test)]
mod testing;

use crate::events::EventManager;

#[derive(Clone, Debug)]
pub struct Data {
    pub paste_count: Arc<PasteCountService>,
    pub task_manager: Arc<TaskManager>,
    pub event_manager: Arc<EventManager>,
}

impl Data {
    pub async fn init_tasks(&self, ctx: &serenity::Context, config: &Config) {
        let sweep = PasteCountTask::new(self.paste_count.clone(), config.update_interval);
        self.task_manager.add_task(sweep).await;

        self.task_manager.start_tasks(ctx.clone()).await;
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to log in: {0}")]
    Auth(#[source] serenity::Error),
    #[error("Gateway connection ended: {0}")]
    Gateway(#[source] serenity::Error),
}

impl StartupError {
    /// Splits errors from `Client::start`: a rejected token is a login
    /// failure, anything else happened on an established gateway session.
    fn from_gateway(err: serenity::Error) -> Self {
        if matches!(
            err,
            serenity::Error::Gateway(serenity::GatewayError::InvalidAuthentication)
        ) {
            Self::Auth(err)
        } else {
            Self::Gateway(err)
        }
    }
}

#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    info!("starting pastecount");

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    let intents = serenity::GatewayIntents::GUILDS;
    let token = config.token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions::<Data, Error> {
            allowed_mentions: Some(CreateAllowedMentions::new().empty_roles().empty_users()),
            commands: vec![register(), pastecount()],
            pre_command: |ctx| {
                Box::pin(async move {
                    trace!(
                        "Command {} used by {} in {}",
                        ctx.command().qualified_name,
                        ctx.author().tag(),
                        ctx.guild_id()
                            .map_or_else(|| "DM".to_string(), |id| id.to_string())
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!(
                                "Command {} failed for {} in {}: {:?}",
                                ctx.command().qualified_name,
                                ctx.author().tag(),
                                ctx.guild_id()
                                    .map_or_else(|| "DM".to_string(), |id| id.to_string()),
                                error
                            );
                        }
                        err => error!("Other framework error: {:?}", err),
                    }
                })
            },
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    data.event_manager.handle_event(ctx, event).await;
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}!", ready.user.tag());

                info!("registering commands");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let source = Arc::new(PasteCountClient::new(config.paste_count_url.clone()));
                let paste_count = Arc::new(PasteCountService::new(source));
                let task_manager = Arc::new(TaskManager::new());
                let event_manager = Arc::new(EventManager::new());

                event_manager.add_handler(ReadyHandler).await;
                event_manager
                    .add_handler(GuildJoinHandler::new(paste_count.clone()))
                    .await;

                let data = Data {
                    paste_count,
                    task_manager,
                    event_manager,
                };
                data.init_tasks(ctx, &config).await;

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .map_err(StartupError::Auth)?;

    client.start().await.map_err(StartupError::from_gateway)
}

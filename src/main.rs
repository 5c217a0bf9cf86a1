pub mod boost;
pub mod commands;
pub mod config;
pub mod discord;
pub mod events;
pub mod moderation;
pub mod util;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::commands::tags::TagStore;
use crate::config::{get_configuration, Config};
use poise::serenity_prelude::{self as serenity, ClientBuilder, GuildId, UserId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, instrument, warn, Level};
use tracing_subscriber::{
    fmt::{self, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;
type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    log_setup()?;

    let config = get_configuration()?;
    let database = PgPool::connect_lazy(&config.database.connection_string())?;
    sqlx::migrate!("./migrations").run(&database).await?;

    let mut client = app(config, database).await?;

    client.start().await?;

    Ok(())
}

#[instrument(skip(config, database), err)]
async fn app(config: Config, database: PgPool) -> Result<serenity::Client, Error> {
    let owners = config
        .application
        .owners
        .iter()
        .filter_map(|x| x.parse::<u64>().ok().map(UserId::new))
        .collect::<HashSet<UserId>>();
    debug!("owners: {owners:?}");

    let options = poise::FrameworkOptions {
        commands: vec![
            commands::misc::ping(),
            commands::misc::help(),
            commands::misc::register(),
            commands::moderation::ban(),
            commands::moderation::timeout(),
            commands::moderation::ban_user(),
            commands::moderation::ban_message(),
            commands::moderation::timeout_user(),
            commands::moderation::timeout_message(),
            commands::tags::tag(),
            commands::boostrole::boostrole(),
        ],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some("!".into()),
            ..Default::default()
        },
        pre_command: |ctx| {
            Box::pin(async move {
                let channel_name = ctx
                    .channel_id()
                    .name(&ctx.serenity_context())
                    .await
                    .unwrap_or_else(|_| "<unknown>".to_owned());

                tracing::info!(
                    user = ?ctx.author().tag(),
                    ?channel_name,
                    invocation_string = ?ctx.invocation_string()
                )
            })
        },
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::event_handler(ctx, event, framework, data))
        },
        owners,

        ..Default::default()
    };

    let tags = TagStore::load(Path::new(&config.application.tags_dir))?;

    let token = config.application.discord.clone();

    let framework = poise::Framework::builder()
        .setup(move |ctx, _bot, _framework| {
            let http = ctx.http.clone();
            let pool = database.clone();
            let guild_id = GuildId::new(config.application.guild_id);

            Box::pin(async move {
                start_reconciliation(http, pool, guild_id).await?;

                Ok(Data {
                    settings: config,
                    database,
                    tags,
                })
            })
        })
        .options(options)
        .build();

    let client = ClientBuilder::new(
        token.expose_secret(),
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::GUILD_MEMBERS,
    )
    .framework(framework)
    .await?;

    Ok(client)
}

/// Runs one sweep at startup, then schedules the daily one.
async fn start_reconciliation(
    http: Arc<serenity::Http>,
    pool: PgPool,
    guild_id: GuildId,
) -> Result<(), Error> {
    {
        let http = http.clone();
        let pool = pool.clone();

        tokio::spawn(async move {
            if let Err(e) = boost::reconcile_boost_roles(&http, &pool, guild_id).await {
                error!("startup boost role sweep failed: {e}");
            }
        });
    }

    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(Job::new_async("0 0 14 * * *", move |_uuid, _lock| {
            let http = http.clone();
            let pool = pool.clone();

            Box::pin(async move {
                info!("running daily boost role sweep");

                if let Err(e) = boost::reconcile_boost_roles(&http, &pool, guild_id).await {
                    error!("daily boost role sweep failed: {e}");
                }
            })
        })?)
        .await?;

    scheduler.start().await?;

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { ctx, error, .. } => {
            error!(
                command = %ctx.invoked_command_name(),
                user = %ctx.author().tag(),
                "command failed: {error}"
            );

            if let Err(e) = commands::say_ephemeral(
                ctx,
                "There was an error while executing this command!",
            )
            .await
            {
                warn!("{e}");
            }
        }
        poise::FrameworkError::ArgumentParse {
            error: _,
            input,
            ctx,
            ..
        } => {
            let s = format!(
                "The argument you provided ({}) was incorrect. Press arrow up \u{2191} to change the arguments and press Enter when you're done.",
                input.unwrap_or_else(|| "<empty>".to_owned())
            );
            if let Err(e) = ctx.say(s).await {
                warn!("{e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("error while handling error: {e}");
            }
        }
    }
}

pub struct Data {
    settings: Config,
    database: sqlx::PgPool,
    tags: TagStore,
}

fn log_setup() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let file_appender = tracing_appender::rolling::hourly("./logs", "error");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::Layer::default().with_file(true).with_line_number(true))
        .with(
            fmt::Layer::new()
                .json()
                .with_ansi(false)
                .with_writer(file_appender.with_max_level(Level::ERROR)),
        )
        .try_init()?;

    Ok(())
}

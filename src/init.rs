use std::{str::FromStr, sync::Arc, time::Duration};

use poise::serenity_prelude::{self as serenity, *};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::Instrument;

use crate::{
    book::QuoteBook,
    commands,
    constants::quotes::{DEFAULT_NOTIFICATION_SECS, DEFAULT_REMOTE_URL, DEFAULT_SYNC_INTERVAL_SECS},
    events::{LogEvents, QuoteEvents},
    notifier::ChannelNotifier,
    storage::SqliteStore,
    sync::{self, HttpRemote},
    telemetry, Data,
};

struct SyncSettings {
    remote_url: String,
    interval: Duration,
    notification: Duration,
    channel_id: Option<ChannelId>,
}

async fn init_database() -> anyhow::Result<Pool<Sqlite>> {
    let db_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("missing DATABASE_URL"))?;

    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

fn env_secs(name: &str, default: u64) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|secs| secs.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or_else(|| {
            tracing::debug!("{} not set or invalid, defaulting to {}s.", name, default);
            default
        });

    Duration::from_secs(secs)
}

fn init_sync_settings() -> SyncSettings {
    let remote_url =
        std::env::var("QUOTE_REMOTE_URL").unwrap_or_else(|_| DEFAULT_REMOTE_URL.to_string());
    tracing::info!("syncing quotes with {}.", remote_url);

    let channel_id = std::env::var("QUOTE_SYNC_CHANNEL_ID")
        .ok()
        .and_then(|id| id.parse::<u64>().ok())
        .map(|id| {
            tracing::info!("sending sync notifications to channel with id {}.", id);
            ChannelId::new(id)
        });

    if channel_id.is_none() {
        tracing::warn!("no sync channel id found. sync notifications will only be logged.");
    }

    SyncSettings {
        remote_url,
        interval: env_secs("QUOTE_SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS),
        notification: env_secs("QUOTE_NOTIFICATION_SECS", DEFAULT_NOTIFICATION_SECS),
        channel_id,
    }
}

async fn init_discord_client(token: &str, data: Data) -> anyhow::Result<Client> {
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::help::help(),
                commands::status::status(),
                commands::quote::quote(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("q>".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when registering commands"))?;

                Ok(data)
            }.in_current_span())
        })
        .build();

    let client = ClientBuilder::new(token, intents)
        .framework(framework)
        .activity(serenity::ActivityData::custom("q>quote for some wisdom"))
        .await?;

    Ok(client)
}

pub async fn init() -> anyhow::Result<Client> {
    telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;

    tracing::info!("initializing... please wait warmly.");

    let token = std::env::var("DISCORD_TOKEN").map_err(|_| anyhow::anyhow!("missing DISCORD_TOKEN"))?;

    let db = init_database().await?;
    let settings = init_sync_settings();
    let reqwest_client = reqwest::Client::new();

    let events: Arc<dyn QuoteEvents> = match settings.channel_id {
        Some(channel_id) => Arc::new(ChannelNotifier::new(
            Arc::new(Http::new(&token)),
            channel_id,
            settings.notification,
        )),
        None => Arc::new(LogEvents),
    };

    let book = QuoteBook::open(
        Arc::new(SqliteStore::new(db)),
        Arc::new(HttpRemote::new(reqwest_client, settings.remote_url)),
        events,
    )
    .await
    .map_err(|e| anyhow::anyhow!("failed to load quotes: {e}"))?;

    let data = Data {
        book: Arc::new(book),
        sync_interval: settings.interval,
    };

    let client = init_discord_client(&token, data.clone()).await?;

    tracing::info!("initialized quote sync every {}s!", settings.interval.as_secs());
    sync::spawn_scheduler(data.book.sync_engine(), settings.interval);

    tracing::info!("finished initializing!");
    Ok(client)
}

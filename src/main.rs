use std::{sync::Arc, time::Duration};

use book::QuoteBook;
use constants::STARTUP_TIME;

#[derive(Clone)]
struct Data {
    book: Arc<QuoteBook>,
    sync_interval: Duration,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

mod book;
mod categories;
mod commands;
mod constants;
mod error;
mod events;
mod init;
mod models;
mod notifier;
mod storage;
mod store;
mod sync;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = &*STARTUP_TIME;

    let mut client = init::init().await?;

    client
        .start()
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when running the client"))?;

    Ok(())
}

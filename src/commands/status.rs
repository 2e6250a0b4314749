use std::time::UNIX_EPOCH;

use crate::{
    commands::get_bot_avatar,
    constants::{version::get_version, POISE_VERSION, STARTUP_TIME},
    Context, Error,
};
use poise::serenity_prelude as serenity;
use thousands::Separable;

/// get the bot's status.
#[poise::command(prefix_command)]
#[tracing::instrument(skip_all)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let quote_count = data.book.count().await;
    let category_count = data.book.categories().await.len();

    let engine = data.book.sync_engine();
    let sync_state = format!("{:?}", engine.state()).to_lowercase();

    let last_sync = match engine.last_report() {
        Some(report) if report.remote_failed => {
            format!("<t:{}:R> (server unreachable)", report.finished_at.unix_timestamp())
        }
        Some(report) => format!(
            "<t:{}:R> ({} new)",
            report.finished_at.unix_timestamp(),
            report.added
        ),
        None => "never".to_string(),
    };

    let uptime = STARTUP_TIME
        .duration_since(UNIX_EPOCH)
        .map(|d| format!("<t:{}:R>", d.as_secs()))
        .unwrap_or_else(|_| "unknown".to_string());

    ctx.send(poise::CreateReply::default().embed(
        serenity::CreateEmbed::new()
        .field(
            "about the bot",
            "quotesync keeps a local collection of quotes and syncs it with a remote server, using the [poise](https://github.com/serenity-rs/poise) framework.".to_string(),
            false
        )
        .field("version", get_version(), false)
        .field("rust", format!("[{0}](https://releases.rs/docs/{0})", rustc_version_runtime::version()), true)
        .field("poise", format!("[{0}](https://docs.rs/crate/poise/{0})", POISE_VERSION), true)
        .field("quotes", quote_count.separate_with_commas(), true)
        .field("categories", category_count.separate_with_commas(), true)
        .field("sync interval", format!("{}s", data.sync_interval.as_secs()), true)
        .field("last sync", last_sync, true)
        .field("sync state", sync_state, true)
        .field("uptime", uptime, true)
        .thumbnail(get_bot_avatar(ctx))
    ))
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

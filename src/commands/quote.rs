use poise::serenity_prelude::*;

use crate::{
    constants::quotes::ALL_CATEGORIES, error::QuoteError, models::quotes::Quote, Context, Error,
};

const LIST_LIMIT: usize = 10;

fn quote_embed(quote: &Quote) -> CreateEmbed {
    CreateEmbed::default()
        .description(format!("\"{}\"", quote.text))
        .footer(CreateEmbedFooter::new(format!("- {}", quote.category)))
}

/// show a random quote, optionally from one category.
#[tracing::instrument(skip(ctx))]
#[poise::command(
    prefix_command,
    aliases("quotes"),
    subcommands(
        "add_quote",
        "list_quotes",
        "categories",
        "last_quote",
        "export_quotes",
        "import_quotes",
        "sync_quotes"
    )
)]
pub async fn quote(ctx: Context<'_>, #[rest] category: Option<String>) -> Result<(), Error> {
    let category = category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

    let reply = match ctx.data().book.show_random(category).await {
        Some(quote) => poise::CreateReply::default().embed(quote_embed(&quote)),
        None => match category {
            Some(category) => poise::CreateReply::default()
                .content(format!("no quotes found in category \"{category}\".")),
            None => poise::CreateReply::default().content("there are no quotes yet!"),
        },
    };

    ctx.send(reply)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// add a quote: `quote add <category> <text>`.
#[poise::command(prefix_command, rename = "add")]
#[tracing::instrument(skip(ctx))]
pub async fn add_quote(
    ctx: Context<'_>,
    category: String,
    #[rest] text: String,
) -> Result<(), Error> {
    let content = match ctx.data().book.add(&text, &category).await {
        Some(quote) => format!("added quote to \"{}\".", quote.category),
        None => "a quote needs both a category and some text.".to_string(),
    };

    ctx.send(poise::CreateReply::default().content(content))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// list quotes, optionally from one category.
#[poise::command(prefix_command, rename = "list")]
#[tracing::instrument(skip(ctx))]
pub async fn list_quotes(ctx: Context<'_>, #[rest] category: Option<String>) -> Result<(), Error> {
    let category = category.unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let category = category.trim();

    if category != ALL_CATEGORIES && !ctx.data().book.categories().await.contains(category) {
        ctx.send(
            poise::CreateReply::default()
                .content(format!("category \"{category}\" does not exist.")),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

        return Ok(());
    }

    let quotes = ctx.data().book.quotes_in(category).await;

    if quotes.is_empty() {
        ctx.send(poise::CreateReply::default().content("no quotes found!"))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

        return Ok(());
    }

    let mut description = String::new();

    for (idx, quote) in quotes.iter().take(LIST_LIMIT).enumerate() {
        description += &format!("{}. {}\n", idx + 1, quote);
    }

    if quotes.len() > LIST_LIMIT {
        description += &format!("...and {} more.", quotes.len() - LIST_LIMIT);
    }

    ctx.send(
        poise::CreateReply::default().embed(
            CreateEmbed::default()
                .title(format!("quotes ({category})"))
                .description(description),
        ),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// list every category with its quote count.
#[poise::command(prefix_command)]
#[tracing::instrument(skip_all)]
pub async fn categories(ctx: Context<'_>) -> Result<(), Error> {
    let book = &ctx.data().book;
    let index = book.categories().await;

    let mut description = String::new();

    for category in index.iter() {
        let count = book.quotes_in(category).await.len();
        description += &format!("- {category} ({count})\n");
    }

    if index.is_empty() {
        description = "no categories yet!".to_string();
    }

    ctx.send(
        poise::CreateReply::default().embed(
            CreateEmbed::default()
                .title("categories")
                .description(description),
        ),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// show the last quote that was displayed.
#[poise::command(prefix_command, rename = "last")]
#[tracing::instrument(skip_all)]
pub async fn last_quote(ctx: Context<'_>) -> Result<(), Error> {
    let reply = match ctx.data().book.last_viewed().await {
        Some(quote) => poise::CreateReply::default().embed(quote_embed(&quote)),
        None => poise::CreateReply::default().content("no quote has been shown yet."),
    };

    ctx.send(reply)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// download every quote as a JSON file.
#[poise::command(prefix_command, rename = "export")]
#[tracing::instrument(skip_all)]
pub async fn export_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let json = ctx
        .data()
        .book
        .export_json()
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when exporting quotes"))?;

    ctx.send(
        poise::CreateReply::default()
            .content("here are all the quotes!")
            .attachment(CreateAttachment::bytes(json.into_bytes(), "quotes.json")),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// add every quote from an attached JSON file.
#[poise::command(prefix_command, rename = "import")]
#[tracing::instrument(skip_all)]
pub async fn import_quotes(ctx: Context<'_>, file: Attachment) -> Result<(), Error> {
    let bytes = file.download().await.inspect_err(
        |e| tracing::error!(err = ?e, filename = %file.filename, "an error occurred when downloading attachment"),
    )?;

    let content = match ctx.data().book.import_bytes(bytes).await {
        Ok(count) => format!("imported {count} quotes!"),
        Err(QuoteError::InvalidFormat(reason)) => format!("invalid file format: {reason}"),
        Err(e) => return Err(e.into()),
    };

    ctx.send(poise::CreateReply::default().content(content))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// sync with the server now.
#[poise::command(prefix_command, rename = "sync")]
#[tracing::instrument(skip_all)]
pub async fn sync_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let msg = ctx
        .send(poise::CreateReply::default().content("syncing with the server..."))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    let report = ctx.data().book.sync_now().await;

    let content = if report.remote_failed {
        "couldn't reach the server, keeping the local quotes as they are.".to_string()
    } else {
        crate::notifier::sync_message(report.added)
    };

    msg.edit(ctx, poise::CreateReply::default().content(content))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    Ok(())
}

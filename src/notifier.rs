use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, CreateMessage, Http};
use tracing::Instrument;

use crate::{error::QuoteError, events::QuoteEvents, models::quotes::Quote};

/// posts sync results to a channel and deletes them again after a while.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
    dismiss_after: Duration,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, dismiss_after: Duration) -> Self {
        Self {
            http,
            channel_id,
            dismiss_after,
        }
    }
}

pub(crate) fn sync_message(added: usize) -> String {
    match added {
        1 => "synced 1 new quote from the server!".to_string(),
        n => format!("synced {n} new quotes from the server!"),
    }
}

#[async_trait]
impl QuoteEvents for ChannelNotifier {
    async fn on_quote_displayed(&self, quote: &Quote) {
        tracing::debug!(category = %quote.category, "displayed quote");
    }

    async fn on_sync_completed(&self, added: usize) {
        if added == 0 {
            return;
        }

        let msg = match self
            .channel_id
            .send_message(
                self.http.as_ref(),
                CreateMessage::default().content(sync_message(added)),
            )
            .await
        {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when sending sync notification");
                return;
            }
        };

        let http = self.http.clone();
        let dismiss_after = self.dismiss_after;

        tokio::spawn(
            async move {
                tokio::time::sleep(dismiss_after).await;

                if let Err(e) = msg.delete(http.as_ref()).await {
                    tracing::warn!(err = ?e, "an error occurred when dismissing sync notification");
                }
            }
            .in_current_span(),
        );
    }

    async fn on_import_result(&self, result: Result<usize, &QuoteError>) {
        match result {
            Ok(count) => tracing::info!(count, "imported quotes from attachment"),
            Err(e) => tracing::warn!(err = ?e, "rejected quote import"),
        }
    }
}

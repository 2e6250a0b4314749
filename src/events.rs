use async_trait::async_trait;

use crate::{error::QuoteError, models::quotes::Quote};

/// callbacks the quote core fires towards whatever renders it.
///
/// every method defaults to doing nothing.
#[async_trait]
pub trait QuoteEvents: Send + Sync {
    async fn on_quote_displayed(&self, _quote: &Quote) {}

    async fn on_sync_completed(&self, _added: usize) {}

    async fn on_import_result(&self, _result: Result<usize, &QuoteError>) {}
}

/// only writes events to the log.
pub struct LogEvents;

#[async_trait]
impl QuoteEvents for LogEvents {
    async fn on_quote_displayed(&self, quote: &Quote) {
        tracing::debug!(category = %quote.category, "displayed quote");
    }

    async fn on_sync_completed(&self, added: usize) {
        tracing::info!(added, "sync completed");
    }

    async fn on_import_result(&self, result: Result<usize, &QuoteError>) {
        match result {
            Ok(count) => tracing::info!(count, "import succeeded"),
            Err(e) => tracing::warn!(err = ?e, "import failed"),
        }
    }
}

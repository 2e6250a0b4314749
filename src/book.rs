use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    categories::CategoryIndex,
    error::{QuoteError, Result},
    events::QuoteEvents,
    models::quotes::Quote,
    storage::KeyValueStore,
    store::QuoteStore,
    sync::{RemoteSource, SyncEngine, SyncReport},
};

/// entry point for the front end: owns the store, the sync engine and the
/// event sink, and keeps them in step.
pub struct QuoteBook {
    store: Arc<Mutex<QuoteStore>>,
    sync: Arc<SyncEngine>,
    events: Arc<dyn QuoteEvents>,
}

impl QuoteBook {
    pub async fn open(
        storage: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteSource>,
        events: Arc<dyn QuoteEvents>,
    ) -> Result<Self> {
        let store = Arc::new(Mutex::new(QuoteStore::load(storage).await?));
        let sync = Arc::new(SyncEngine::new(store.clone(), remote, events.clone()));

        Ok(Self {
            store,
            sync,
            events,
        })
    }

    pub fn sync_engine(&self) -> Arc<SyncEngine> {
        self.sync.clone()
    }

    pub async fn show_random(&self, category: Option<&str>) -> Option<Quote> {
        let quote = self.store.lock().await.random(category).await?;
        self.events.on_quote_displayed(&quote).await;

        Some(quote)
    }

    pub async fn last_viewed(&self) -> Option<Quote> {
        self.store.lock().await.last_viewed().await
    }

    /// adds a quote locally, then offers it to the remote in the background.
    pub async fn add(&self, text: &str, category: &str) -> Option<Quote> {
        let quote = self.store.lock().await.add(text, category).await?;
        self.sync.push_detached(quote.clone());

        Some(quote)
    }

    pub async fn import_json(&self, payload: &str) -> Result<usize> {
        let result = self.store.lock().await.import_bulk(payload).await;
        self.events.on_import_result(result.as_ref().copied()).await;

        result
    }

    /// imports a raw upload. bytes that aren't UTF-8 are an invalid format.
    pub async fn import_bytes(&self, bytes: Vec<u8>) -> Result<usize> {
        match String::from_utf8(bytes) {
            Ok(payload) => self.import_json(&payload).await,
            Err(e) => {
                let err = QuoteError::InvalidFormat(format!("payload is not UTF-8 text: {e}"));
                self.events.on_import_result(Err(&err)).await;

                Err(err)
            }
        }
    }

    pub async fn export_json(&self) -> Result<String> {
        self.store.lock().await.export_all()
    }

    pub async fn sync_now(&self) -> SyncReport {
        self.sync.tick().await
    }

    pub async fn categories(&self) -> CategoryIndex {
        self.store.lock().await.categories().clone()
    }

    pub async fn quotes_in(&self, category: &str) -> Vec<Quote> {
        self.store
            .lock()
            .await
            .in_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.store.lock().await.quotes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::quotes::QUOTES_KEY,
        events::testing::{Recorded, RecordingEvents},
        storage::testing::{MemoryStore, UnreadableStore},
        sync::testing::ScriptedRemote,
    };

    async fn book_with(remote: ScriptedRemote) -> (QuoteBook, Arc<ScriptedRemote>, Arc<RecordingEvents>) {
        let remote = Arc::new(remote);
        let events = Arc::new(RecordingEvents::default());
        let book = QuoteBook::open(
            Arc::new(MemoryStore::default()),
            remote.clone(),
            events.clone(),
        )
        .await
        .unwrap();

        (book, remote, events)
    }

    #[tokio::test]
    async fn show_random_fires_displayed_event() {
        let (book, _, events) = book_with(ScriptedRemote::default()).await;

        let quote = book.show_random(Some("Wisdom")).await.unwrap();

        assert_eq!(quote.category, "Wisdom");
        assert_eq!(events.take(), vec![Recorded::Displayed(quote.clone())]);
        assert_eq!(book.last_viewed().await, Some(quote));
    }

    #[tokio::test]
    async fn add_pushes_new_quote_to_remote() {
        let (book, remote, _) = book_with(ScriptedRemote::default()).await;

        let quote = book.add("Ship it.", "Motivation").await.unwrap();
        // let the detached push run
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(book.count().await, 6);
        assert_eq!(*remote.pushed.lock().unwrap(), vec![quote]);
    }

    #[tokio::test]
    async fn blank_add_pushes_nothing() {
        let (book, remote, _) = book_with(ScriptedRemote::default()).await;

        assert!(book.add(" ", "Motivation").await.is_none());
        tokio::task::yield_now().await;

        assert_eq!(book.count().await, 5);
        assert!(remote.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_reports_result_to_events() {
        let (book, _, events) = book_with(ScriptedRemote::default()).await;

        assert_eq!(
            book.import_json(r#"[{"text":"x","category":"y"}]"#).await.unwrap(),
            1
        );
        assert!(matches!(
            book.import_json(r#"{"text":"x","category":"y"}"#).await,
            Err(QuoteError::InvalidFormat(_))
        ));

        let recorded = events.take();
        assert_eq!(recorded[0], Recorded::Imported(Ok(1)));
        assert!(matches!(recorded[1], Recorded::Imported(Err(_))));
        assert_eq!(book.count().await, 6);
        assert!(book.categories().await.contains("y"));
    }

    #[tokio::test]
    async fn undecodable_upload_reports_result_to_events() {
        let (book, _, events) = book_with(ScriptedRemote::default()).await;

        let result = book.import_bytes(vec![0xff, 0xfe, b'[', b']']).await;

        assert!(matches!(result, Err(QuoteError::InvalidFormat(_))));
        assert!(matches!(events.take().as_slice(), [Recorded::Imported(Err(_))]));
        assert_eq!(book.count().await, 5);

        assert_eq!(book.import_bytes(b"[]".to_vec()).await.unwrap(), 0);
        assert_eq!(events.take(), vec![Recorded::Imported(Ok(0))]);
    }

    #[tokio::test]
    async fn open_refuses_unreadable_storage() {
        let storage = Arc::new(UnreadableStore::default());
        storage
            .inner
            .set(QUOTES_KEY, r#"[{"text":"mine","category":"User"}]"#)
            .await
            .unwrap();

        let result = QuoteBook::open(
            storage.clone(),
            Arc::new(ScriptedRemote::with(vec![Ok(vec![])])),
            Arc::new(RecordingEvents::default()),
        )
        .await;

        assert!(matches!(result, Err(QuoteError::Storage(_))));
        let raw = storage.inner.get(QUOTES_KEY).await.unwrap().unwrap();
        assert!(raw.contains("mine"));
        assert!(!raw.contains("Motivation"));
    }

    #[tokio::test]
    async fn sync_now_absorbs_server_quotes() {
        let (book, _, events) =
            book_with(ScriptedRemote::with(vec![Ok(vec![Quote::new("sunt aut", "Server")])])).await;

        let report = book.sync_now().await;

        assert_eq!(report.added, 1);
        assert_eq!(book.quotes_in("Server").await, vec![Quote::new("sunt aut", "Server")]);
        assert_eq!(events.take(), vec![Recorded::Synced(1)]);
        assert_eq!(book.sync_engine().last_report(), Some(report));
    }
}

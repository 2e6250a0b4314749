use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::{
    categories::CategoryIndex,
    constants::quotes::{ALL_CATEGORIES, LAST_VIEWED_KEY, QUOTES_KEY, SEED_QUOTES},
    error::{QuoteError, Result},
    models::quotes::Quote,
    storage::KeyValueStore,
};

/// the authoritative quote collection and its durable copy.
///
/// every mutating method persists the full collection and rebuilds the
/// category index before returning.
pub struct QuoteStore {
    storage: Arc<dyn KeyValueStore>,
    quotes: Vec<Quote>,
    categories: CategoryIndex,
}

pub fn seed_quotes() -> Vec<Quote> {
    SEED_QUOTES
        .iter()
        .map(|(text, category)| Quote::new(*text, *category))
        .collect()
}

/// pretty-printed JSON array of the whole collection.
pub fn export_all(quotes: &[Quote]) -> Result<String> {
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// parses an import payload. anything other than a JSON array of quotes is rejected.
pub fn parse_import(payload: &str) -> Result<Vec<Quote>> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| QuoteError::InvalidFormat(format!("payload is not valid JSON: {e}")))?;

    if !value.is_array() {
        return Err(QuoteError::InvalidFormat(
            "expected a JSON array of quotes".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| QuoteError::InvalidFormat(format!("malformed quote in array: {e}")))
}

impl QuoteStore {
    /// restores the collection from storage, falling back to the seed quotes
    /// when nothing is stored or the stored value can't be parsed.
    ///
    /// any other storage error is returned, so an unreadable store is never
    /// overwritten with the seed.
    #[tracing::instrument(skip_all)]
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let quotes = match Self::read_collection(storage.as_ref()).await {
            Ok(Some(quotes)) => {
                tracing::info!(count = quotes.len(), "restored quotes from storage");
                quotes
            }
            Ok(None) => {
                tracing::info!("no stored quotes found, starting from the seed collection");
                seed_quotes()
            }
            Err(e @ QuoteError::StorageParse(_)) => {
                tracing::warn!(err = ?e, "stored quotes are corrupted, starting from the seed collection");
                seed_quotes()
            }
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when reading stored quotes");
                return Err(e);
            }
        };

        let categories = CategoryIndex::derive(&quotes);

        Ok(Self {
            storage,
            quotes,
            categories,
        })
    }

    async fn read_collection(storage: &dyn KeyValueStore) -> Result<Option<Vec<Quote>>> {
        let Some(raw) = storage.get(QUOTES_KEY).await? else {
            return Ok(None);
        };

        let quotes = serde_json::from_str(&raw).map_err(QuoteError::StorageParse)?;

        Ok(Some(quotes))
    }

    /// overwrites the stored collection with the in-memory one.
    ///
    /// a failed write is logged; the in-memory state stays as it is.
    pub async fn persist(&self) {
        let serialized = match serde_json::to_string(&self.quotes) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::error!(err = ?e, "an error occurred when serializing quotes");
                return;
            }
        };

        if let Err(e) = self.storage.set(QUOTES_KEY, &serialized).await {
            tracing::error!(err = ?e, count = self.quotes.len(), "an error occurred when persisting quotes");
        }
    }

    /// replaces the collection, then persists and reindexes it.
    pub(crate) async fn commit(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
        self.categories = CategoryIndex::derive(&self.quotes);
        self.persist().await;
    }

    /// appends a user-supplied quote. blank text or category is a no-op.
    pub async fn add(&mut self, text: &str, category: &str) -> Option<Quote> {
        let quote = Quote::from_input(text, category)?;

        let mut quotes = std::mem::take(&mut self.quotes);
        quotes.push(quote.clone());
        self.commit(quotes).await;

        tracing::info!(category = %quote.category, "added quote");

        Some(quote)
    }

    /// appends every quote of a JSON array payload, without dedup or validation.
    ///
    /// returns how many quotes were appended. on error nothing changes.
    pub async fn import_bulk(&mut self, payload: &str) -> Result<usize> {
        let imported = parse_import(payload)?;
        let count = imported.len();

        let mut quotes = std::mem::take(&mut self.quotes);
        quotes.extend(imported);
        self.commit(quotes).await;

        tracing::info!(count, "imported quotes");

        Ok(count)
    }

    pub fn export_all(&self) -> Result<String> {
        export_all(&self.quotes)
    }

    /// picks a random quote, optionally from one category, and remembers it as
    /// the last viewed quote.
    pub async fn random(&self, category: Option<&str>) -> Option<Quote> {
        let candidates = self.in_category(category.unwrap_or(ALL_CATEGORIES));
        let quote = candidates.choose(&mut rand::thread_rng()).map(|q| (*q).clone())?;

        match serde_json::to_string(&quote) {
            Ok(serialized) => {
                if let Err(e) = self.storage.set(LAST_VIEWED_KEY, &serialized).await {
                    tracing::warn!(err = ?e, "an error occurred when saving last viewed quote");
                }
            }
            Err(e) => tracing::warn!(err = ?e, "an error occurred when serializing last viewed quote"),
        }

        Some(quote)
    }

    pub async fn last_viewed(&self) -> Option<Quote> {
        let raw = self
            .storage
            .get(LAST_VIEWED_KEY)
            .await
            .inspect_err(|e| tracing::warn!(err = ?e, "an error occurred when reading last viewed quote"))
            .ok()??;

        serde_json::from_str(&raw).ok()
    }

    /// quotes of `category` in insertion order. `"all"` matches every quote.
    pub fn in_category(&self, category: &str) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| category == ALL_CATEGORIES || q.category == category)
            .collect()
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{MemoryStore, UnreadableStore};

    async fn stored(quotes: &[Quote]) -> Arc<dyn KeyValueStore> {
        let storage = Arc::new(MemoryStore::default());
        storage
            .set(QUOTES_KEY, &serde_json::to_string(quotes).unwrap())
            .await
            .unwrap();

        storage
    }

    async fn stored_quotes(storage: &Arc<dyn KeyValueStore>) -> Vec<Quote> {
        let raw = storage.get(QUOTES_KEY).await.unwrap().unwrap();

        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn load_empty_storage_uses_seed() {
        let store = QuoteStore::load(Arc::new(MemoryStore::default())).await.unwrap();

        assert_eq!(store.quotes(), seed_quotes().as_slice());
        assert_eq!(
            store.categories().iter().collect::<Vec<_>>(),
            vec!["Motivation", "Wisdom", "Inspiration", "Learning"]
        );
    }

    #[tokio::test]
    async fn load_corrupted_storage_uses_seed() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        storage.set(QUOTES_KEY, "{not json").await.unwrap();

        let store = QuoteStore::load(storage).await.unwrap();

        assert_eq!(store.quotes().len(), 5);
    }

    #[tokio::test]
    async fn load_unreadable_storage_keeps_stored_collection() {
        let storage = Arc::new(UnreadableStore::default());
        storage
            .inner
            .set(QUOTES_KEY, r#"[{"text":"mine","category":"User"}]"#)
            .await
            .unwrap();

        let result = QuoteStore::load(storage.clone()).await;

        assert!(matches!(result, Err(QuoteError::Storage(_))));
        assert_eq!(
            storage.inner.get(QUOTES_KEY).await.unwrap().as_deref(),
            Some(r#"[{"text":"mine","category":"User"}]"#)
        );
    }

    #[tokio::test]
    async fn load_restores_stored_collection() {
        let quotes = vec![Quote::new("Stay curious.", "Learning")];

        let store = QuoteStore::load(stored(&quotes).await).await.unwrap();

        assert_eq!(store.quotes(), quotes.as_slice());
    }

    #[tokio::test]
    async fn add_persists_trimmed_quote() {
        let storage = stored(&[]).await;
        let mut store = QuoteStore::load(storage.clone()).await.unwrap();

        let added = store.add("  Keep going.  ", " Motivation ").await;

        assert_eq!(added, Some(Quote::new("Keep going.", "Motivation")));
        assert_eq!(stored_quotes(&storage).await, store.quotes());
        assert!(store.categories().contains("Motivation"));
    }

    #[tokio::test]
    async fn add_blank_fields_is_noop() {
        let storage = stored(&[Quote::new("a", "b")]).await;
        let mut store = QuoteStore::load(storage.clone()).await.unwrap();

        assert!(store.add("", "Motivation").await.is_none());
        assert!(store.add("   ", "Motivation").await.is_none());
        assert!(store.add("Keep going.", "\t").await.is_none());

        assert_eq!(store.quotes(), &[Quote::new("a", "b")]);
        assert_eq!(stored_quotes(&storage).await, vec![Quote::new("a", "b")]);
    }

    #[tokio::test]
    async fn import_appends_without_dedup() {
        let storage = stored(&[Quote::new("a", "b")]).await;
        let mut store = QuoteStore::load(storage.clone()).await.unwrap();

        let count = store
            .import_bulk(r#"[{"text":"a","category":"b"},{"text":"","category":"Empty"}]"#)
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            store.quotes(),
            &[
                Quote::new("a", "b"),
                Quote::new("a", "b"),
                Quote::new("", "Empty"),
            ]
        );
        assert_eq!(stored_quotes(&storage).await.len(), 3);
        assert!(store.categories().contains("Empty"));
    }

    #[tokio::test]
    async fn import_object_is_invalid_format() {
        let storage = stored(&[Quote::new("a", "b")]).await;
        let mut store = QuoteStore::load(storage.clone()).await.unwrap();

        let result = store
            .import_bulk(r#"{"text":"a","category":"b"}"#)
            .await;

        assert!(matches!(result, Err(QuoteError::InvalidFormat(_))));
        assert_eq!(store.quotes(), &[Quote::new("a", "b")]);
        assert_eq!(stored_quotes(&storage).await, vec![Quote::new("a", "b")]);
    }

    #[tokio::test]
    async fn import_garbage_is_invalid_format() {
        let mut store = QuoteStore::load(stored(&[]).await).await.unwrap();

        assert!(matches!(
            store.import_bulk("quotes, please").await,
            Err(QuoteError::InvalidFormat(_))
        ));
        assert!(matches!(
            store.import_bulk(r#"[{"quote":"missing fields"}]"#).await,
            Err(QuoteError::InvalidFormat(_))
        ));
        assert!(store.quotes().is_empty());
    }

    #[tokio::test]
    async fn export_then_import_reproduces_collection() {
        let original = QuoteStore::load(Arc::new(MemoryStore::default())).await.unwrap();
        let exported = original.export_all().unwrap();

        let mut restored = QuoteStore::load(stored(&[]).await).await.unwrap();
        restored.import_bulk(&exported).await.unwrap();

        assert_eq!(restored.quotes(), original.quotes());
        assert!(exported.contains("\n  {"));
    }

    #[tokio::test]
    async fn random_respects_category_and_records_last_viewed() {
        let quotes = vec![
            Quote::new("a", "Wisdom"),
            Quote::new("b", "Server"),
            Quote::new("c", "Wisdom"),
        ];
        let store = QuoteStore::load(stored(&quotes).await).await.unwrap();

        for _ in 0..20 {
            let quote = store.random(Some("Server")).await.unwrap();
            assert_eq!(quote, Quote::new("b", "Server"));
        }

        assert_eq!(store.last_viewed().await, Some(Quote::new("b", "Server")));
    }

    #[tokio::test]
    async fn random_on_empty_selection_is_none() {
        let store = QuoteStore::load(stored(&[Quote::new("a", "Wisdom")]).await).await.unwrap();

        assert!(store.random(Some("Missing")).await.is_none());
        assert!(store.last_viewed().await.is_none());
    }

    #[tokio::test]
    async fn in_category_all_matches_everything() {
        let store = QuoteStore::load(Arc::new(MemoryStore::default())).await.unwrap();

        assert_eq!(store.in_category("all").len(), 5);
        assert_eq!(store.in_category("Motivation").len(), 2);
    }
}

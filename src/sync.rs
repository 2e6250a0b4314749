use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use time::OffsetDateTime;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::Instrument;

use crate::{
    constants::quotes::{REMOTE_FETCH_LIMIT, SERVER_CATEGORY},
    error::{QuoteError, Result},
    events::QuoteEvents,
    models::{quotes::Quote, remote::RemotePost},
    store::QuoteStore,
};

/// the remote side of the sync: a read-only snapshot plus a best-effort push.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<Quote>>;
    async fn push_quote(&self, quote: &Quote) -> Result<()>;
}

/// a JSONPlaceholder-style `/posts` endpoint.
pub struct HttpRemote {
    client: reqwest::Client,
    url: String,
}

impl HttpRemote {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_snapshot(&self) -> Result<Vec<Quote>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let text = resp.text().await?;

        let posts: Vec<RemotePost> = serde_json::from_str(&text)
            .map_err(|e| QuoteError::RemoteUnavailable(format!("unexpected response body: {e}")))?;

        Ok(snapshot_from_posts(posts))
    }

    async fn push_quote(&self, quote: &Quote) -> Result<()> {
        self.client
            .post(&self.url)
            .json(quote)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// keeps the first few posts, each filed under the server category.
pub fn snapshot_from_posts(posts: Vec<RemotePost>) -> Vec<Quote> {
    posts
        .into_iter()
        .take(REMOTE_FETCH_LIMIT)
        .map(|post| post.into_quote(SERVER_CATEGORY))
        .collect()
}

/// appends every remote quote not already present, local entries untouched.
///
/// returns the merged collection and how many remote quotes were new.
pub fn merge(local: &[Quote], remote: Vec<Quote>) -> (Vec<Quote>, usize) {
    let mut merged = local.to_vec();
    let mut added = 0;

    for quote in remote {
        if merged.contains(&quote) {
            continue;
        }

        merged.push(quote);
        added += 1;
    }

    (merged, added)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Merging,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub finished_at: OffsetDateTime,
    pub added: usize,
    pub remote_failed: bool,
}

pub struct SyncEngine {
    store: Arc<Mutex<QuoteStore>>,
    remote: Arc<dyn RemoteSource>,
    events: Arc<dyn QuoteEvents>,
    state: StdMutex<SyncState>,
    last_report: StdMutex<Option<SyncReport>>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<Mutex<QuoteStore>>,
        remote: Arc<dyn RemoteSource>,
        events: Arc<dyn QuoteEvents>,
    ) -> Self {
        Self {
            store,
            remote,
            events,
            state: StdMutex::new(SyncState::Idle),
            last_report: StdMutex::new(None),
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn last_report(&self) -> Option<SyncReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// one sync cycle: fetch, merge, persist, notify.
    ///
    /// a failed fetch leaves the store alone and counts as zero new quotes.
    #[tracing::instrument(skip_all)]
    pub async fn tick(&self) -> SyncReport {
        self.set_state(SyncState::Fetching);

        let remote = self
            .remote
            .fetch_snapshot()
            .await
            .inspect_err(|e| tracing::warn!(err = ?e, "an error occurred when fetching remote quotes"))
            .ok();

        let report = match remote {
            Some(remote) => {
                self.set_state(SyncState::Merging);

                let added = {
                    let mut store = self.store.lock().await;
                    let (merged, added) = merge(store.quotes(), remote);
                    store.commit(merged).await;

                    added
                };

                tracing::info!(added, "merged remote quotes");

                SyncReport {
                    finished_at: OffsetDateTime::now_utc(),
                    added,
                    remote_failed: false,
                }
            }
            None => SyncReport {
                finished_at: OffsetDateTime::now_utc(),
                added: 0,
                remote_failed: true,
            },
        };

        self.set_state(SyncState::Idle);
        *self.last_report.lock().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());

        if !report.remote_failed {
            self.events.on_sync_completed(report.added).await;
        }

        report
    }

    /// sends a quote to the remote in the background. failures are only logged.
    pub fn push_detached(&self, quote: Quote) -> JoinHandle<()> {
        let remote = self.remote.clone();

        tokio::spawn(
            async move {
                match remote.push_quote(&quote).await {
                    Ok(()) => tracing::debug!(category = %quote.category, "pushed quote to remote"),
                    Err(e) => {
                        tracing::warn!(err = ?e, "an error occurred when pushing quote to remote")
                    }
                }
            }
            .in_current_span(),
        )
    }
}

/// ticks `engine` every `period`, starting immediately.
pub fn spawn_scheduler(engine: Arc<SyncEngine>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            let interval = tokio::time::interval(period);
            let task = futures::stream::unfold(interval, |mut interval| {
                let engine = engine.clone();

                async move {
                    interval.tick().await;
                    let _ = engine.tick().await;

                    Some(((), interval))
                }
            });

            task.for_each(|_| async {}).await;
        }
        .in_current_span(),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::*;

    /// replays queued snapshots; an empty queue fails the fetch.
    #[derive(Default)]
    pub struct ScriptedRemote {
        pub snapshots: StdMutex<VecDeque<Result<Vec<Quote>>>>,
        pub pushed: StdMutex<Vec<Quote>>,
        pub fail_push: bool,
    }

    impl ScriptedRemote {
        pub fn with(snapshots: Vec<Result<Vec<Quote>>>) -> Self {
            Self {
                snapshots: StdMutex::new(snapshots.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl RemoteSource for ScriptedRemote {
        async fn fetch_snapshot(&self) -> Result<Vec<Quote>> {
            self.snapshots
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(QuoteError::RemoteUnavailable("no snapshot".into())))
        }

        async fn push_quote(&self, quote: &Quote) -> Result<()> {
            if self.fail_push {
                return Err(QuoteError::RemoteUnavailable("push rejected".into()));
            }

            self.pushed.lock().unwrap().push(quote.clone());
            Ok(())
        }
    }
}

// Read-through cached widget state.
// Paints persisted data immediately, then refreshes from the backend when stale.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::{CacheEntry, CacheKey, DEFAULT_TTL, KeyValueStore, WidgetKind};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;

/// Backend operation that fetches a widget payload for a resource.
pub trait ResourceSource<T>: Send + Sync + 'static {
    fn fetch(
        &self,
        resource_id: &str,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<T>> + Send;
}

/// Payloads a cached widget can hold. `Default` is the empty render.
pub trait WidgetData:
    Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> WidgetData for T where
    T: Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// What the widget currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView<T> {
    pub resource_id: Option<String>,
    pub loading: bool,
    pub data: T,
}

/// Result of [`CachedWidget::load`].
pub enum LoadOutcome<T, S> {
    /// No resource id was given; nothing changed.
    Skipped,
    /// A cache entry was painted. Carries a refresh job when the entry is stale.
    Cached { refresh: Option<Refresh<T, S>> },
    /// Nothing cached; the widget is loading until the refresh is applied.
    Missing(Refresh<T, S>),
}

impl<T, S> LoadOutcome<T, S> {
    pub fn into_refresh(self) -> Option<Refresh<T, S>> {
        match self {
            LoadOutcome::Skipped => None,
            LoadOutcome::Cached { refresh } => refresh,
            LoadOutcome::Missing(refresh) => Some(refresh),
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, LoadOutcome::Cached { .. })
    }
}

/// Outcome of a background refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome<T> {
    Fetched(T),
    Failed,
}

/// A finished refresh, addressed to the key it was started for.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshResult<T> {
    pub key: CacheKey,
    pub outcome: RefreshOutcome<T>,
}

/// Background refresh job detached from the widget so it can run on a task.
pub struct Refresh<T, S> {
    key: CacheKey,
    resource_id: String,
    limit: Option<u32>,
    ttl: Duration,
    source: Arc<S>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    _payload: PhantomData<fn() -> T>,
}

impl<T, S> Refresh<T, S>
where
    T: WidgetData,
    S: ResourceSource<T>,
{
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Fetch from the backend and persist on success.
    ///
    /// A failed fetch leaves the stored entry untouched so the next visit still
    /// has the last good data.
    pub async fn run(self) -> RefreshResult<T> {
        let outcome = match self.source.fetch(&self.resource_id, self.limit).await {
            Ok(data) => {
                let entry = CacheEntry::new(self.key.as_str(), data, self.ttl, self.clock.now());
                let persisted = entry
                    .to_json()
                    .and_then(|json| self.store.set(self.key.as_str(), &json));
                if let Err(e) = persisted {
                    tracing::warn!(key = %self.key, error = %e, "failed to persist cache entry");
                } else {
                    tracing::debug!(key = %self.key, "cache entry refreshed");
                }
                RefreshOutcome::Fetched(entry.data)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "refresh failed");
                RefreshOutcome::Failed
            }
        };

        RefreshResult {
            key: self.key,
            outcome,
        }
    }
}

/// One independently cached widget (pinned messages, media, stats).
///
/// Instances are not coordinated with each other: two widgets on the same
/// resource each run their own read/refresh cycle and the last store write wins.
pub struct CachedWidget<T, S> {
    kind: WidgetKind,
    ttl: Duration,
    limit: Option<u32>,
    source: Arc<S>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: Option<CacheKey>,
    view: WidgetView<T>,
}

impl<T, S> CachedWidget<T, S>
where
    T: WidgetData,
    S: ResourceSource<T>,
{
    pub fn new(kind: WidgetKind, source: Arc<S>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kind,
            ttl: DEFAULT_TTL,
            limit: None,
            source,
            store,
            clock: Arc::new(SystemClock),
            key: None,
            view: WidgetView {
                resource_id: None,
                loading: true,
                data: T::default(),
            },
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn key(&self) -> Option<&CacheKey> {
        self.key.as_ref()
    }

    pub fn view(&self) -> &WidgetView<T> {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.view.loading
    }

    pub fn data(&self) -> &T {
        &self.view.data
    }

    /// Point the widget at `resource_id` and paint whatever is cached.
    pub fn load(&mut self, resource_id: &str) -> LoadOutcome<T, S> {
        let key = match CacheKey::new(self.kind, resource_id) {
            Ok(key) => key,
            Err(_) => {
                tracing::debug!(kind = self.kind.slug(), "load skipped: no resource id");
                return LoadOutcome::Skipped;
            }
        };

        self.key = Some(key.clone());
        self.view.resource_id = Some(resource_id.to_string());
        let refresh = self.refresh_job(key.clone(), resource_id);

        match self.read_entry(&key) {
            Some(entry) => {
                let stale = entry.is_stale(self.ttl, self.clock.now());
                self.view.data = entry.data;
                self.view.loading = false;
                tracing::debug!(%key, stale, "cache hit");
                LoadOutcome::Cached {
                    refresh: stale.then_some(refresh),
                }
            }
            None => {
                self.view.data = T::default();
                self.view.loading = true;
                tracing::debug!(%key, "cache miss");
                LoadOutcome::Missing(refresh)
            }
        }
    }

    /// Start a refresh for the current resource regardless of staleness.
    pub fn refresh(&self) -> Option<Refresh<T, S>> {
        let key = self.key.clone()?;
        let resource_id = self.view.resource_id.clone()?;
        Some(self.refresh_job(key, &resource_id))
    }

    /// Apply a finished refresh. Returns false if it was addressed to a
    /// resource this widget no longer shows.
    pub fn apply(&mut self, result: RefreshResult<T>) -> bool {
        if self.key.as_ref() != Some(&result.key) {
            tracing::debug!(key = %result.key, "discarding refresh for previous resource");
            return false;
        }

        self.view.data = match result.outcome {
            RefreshOutcome::Fetched(data) => data,
            RefreshOutcome::Failed => T::default(),
        };
        self.view.loading = false;
        true
    }

    /// Load and, if needed, await the refresh inline.
    pub async fn load_and_refresh(&mut self, resource_id: &str) {
        if let Some(refresh) = self.load(resource_id).into_refresh() {
            let result = refresh.run().await;
            self.apply(result);
        }
    }

    fn refresh_job(&self, key: CacheKey, resource_id: &str) -> Refresh<T, S> {
        Refresh {
            key,
            resource_id: resource_id.to_string(),
            limit: self.limit,
            ttl: self.ttl,
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            _payload: PhantomData,
        }
    }

    /// Read errors and unparseable entries count as misses.
    fn read_entry(&self, key: &CacheKey) -> Option<CacheEntry<T>> {
        let json = match self.store.get(key.as_str()) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%key, error = %e, "cache read failed");
                return None;
            }
        };

        match CacheEntry::<T>::from_json(&json) {
            Ok(entry) if entry.key == key.as_str() => Some(entry),
            Ok(entry) => {
                tracing::warn!(%key, stored = %entry.key, "cache entry under wrong key");
                None
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "corrupt cache entry");
                None
            }
        }
    }
}

// ── Keyed read cache ──
//
// Reads are identified by a `QueryKey`. Concurrent reads with the same key
// share one in-flight future, completed reads are served until they are
// invalidated or pass the stale time, and every key publishes its
// `QueryStatus` through a watch channel.

pub mod mutation;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CallDuration, Msisdn, Subscriber};

pub use mutation::{MutationStatus, MutationTracker};

// ── Keys and status ─────────────────────────────────────────────────

/// Identity of a read: the operation plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllUsers,
    UserDetail(Msisdn),
    CallDuration(Msisdn),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllUsers => f.write_str("users"),
            Self::UserDetail(m) => write!(f, "user/{m}"),
            Self::CallDuration(m) => write!(f, "call-duration/{m}"),
        }
    }
}

/// The single observable state of a read.
#[derive(Debug)]
pub enum QueryStatus<T> {
    /// Disabled, or never run.
    Idle,
    Loading,
    Error(CoreError),
    Success(Arc<T>),
}

// Manual impl: `Arc<T>` is cloneable whether or not `T` is.
impl<T> Clone for QueryStatus<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Error(e) => Self::Error(e.clone()),
            Self::Success(v) => Self::Success(Arc::clone(v)),
        }
    }
}

impl<T> QueryStatus<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    /// `Ok(None)` for a read that never produced anything (Idle/Loading).
    pub fn into_result(self) -> Result<Option<Arc<T>>, CoreError> {
        match self {
            Self::Success(v) => Ok(Some(v)),
            Self::Error(e) => Err(e),
            Self::Idle | Self::Loading => Ok(None),
        }
    }
}

// ── QueryCache ──────────────────────────────────────────────────────

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, CoreError>>>;

/// Cache for one payload type.
///
/// Cheaply cloneable; clones share state.
pub struct QueryCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CacheInner<T> {
    stale_time: Duration,
    slots: DashMap<QueryKey, watch::Sender<QueryStatus<T>>>,
    inflight: DashMap<QueryKey, (u64, SharedFetch<T>)>,
    fetched_at: DashMap<QueryKey, Instant>,
    next_fetch_id: AtomicU64,
    /// Per-key counter bumped by invalidation. A fetch that started under an
    /// older generation hands its result to its own callers and nothing else.
    generations: DashMap<QueryKey, u64>,
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                stale_time,
                slots: DashMap::new(),
                inflight: DashMap::new(),
                fetched_at: DashMap::new(),
                next_fetch_id: AtomicU64::new(0),
                generations: DashMap::new(),
            }),
        }
    }

    /// Resolve `key`, reusing a fresh cached value or an in-flight fetch.
    ///
    /// `fetcher` is only invoked when a new request must be issued.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        if let Some(hit) = self.fresh(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }
        let shared = self.join_or_start(key, fetcher);
        shared.await
    }

    /// Run a read that may be disabled. A disabled read stays `Idle` and
    /// never calls `fetcher`.
    pub async fn query<F, Fut>(&self, key: QueryKey, enabled: bool, fetcher: F) -> QueryStatus<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        if !enabled {
            return QueryStatus::Idle;
        }
        match self.fetch(key, fetcher).await {
            Ok(v) => QueryStatus::Success(v),
            Err(e) => QueryStatus::Error(e),
        }
    }

    /// Current status of `key` without triggering a fetch.
    pub fn status(&self, key: &QueryKey) -> QueryStatus<T> {
        self.inner
            .slots
            .get(key)
            .map_or(QueryStatus::Idle, |slot| slot.borrow().clone())
    }

    /// Subscribe to status changes for `key`.
    pub fn watch(&self, key: &QueryKey) -> watch::Receiver<QueryStatus<T>> {
        self.inner
            .slots
            .entry(key.clone())
            .or_insert_with(|| watch::channel(QueryStatus::Idle).0)
            .subscribe()
    }

    /// Mark `key` stale. The last value stays visible until the next read
    /// replaces it; a fetch already running is detached from the key.
    pub fn invalidate(&self, key: &QueryKey) {
        self.inner.bump_generation(key);
        self.inner.fetched_at.remove(key);
        self.inner.inflight.remove(key);
        debug!(%key, "invalidated");
    }

    /// Drop everything cached under `key`. Watchers observe the channel closing.
    pub fn remove(&self, key: &QueryKey) {
        self.invalidate(key);
        self.inner.slots.remove(key);
    }

    pub fn clear(&self) {
        let running: Vec<QueryKey> = self.inner.inflight.iter().map(|e| e.key().clone()).collect();
        for key in &running {
            self.inner.bump_generation(key);
        }
        self.inner.inflight.clear();
        self.inner.fetched_at.clear();
        self.inner.slots.clear();
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.inner.slots.iter().map(|e| e.key().clone()).collect()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn fresh(&self, key: &QueryKey) -> Option<Arc<T>> {
        if self.inner.stale_time.is_zero() {
            return None;
        }
        let fetched = *self.inner.fetched_at.get(key)?;
        if fetched.elapsed() >= self.inner.stale_time {
            return None;
        }
        self.status(key).data().cloned()
    }

    fn join_or_start<F, Fut>(&self, key: QueryKey, fetcher: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        use dashmap::mapref::entry::Entry;

        match self.inner.inflight.entry(key.clone()) {
            Entry::Occupied(existing) => {
                debug!(%key, "joining in-flight read");
                existing.get().1.clone()
            }
            Entry::Vacant(slot) => {
                let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                let generation = self.inner.generation(&key);
                let inner = Arc::clone(&self.inner);
                let request = fetcher();

                self.inner.publish(&key, QueryStatus::Loading);
                debug!(%key, "starting read");

                let shared = async move {
                    let result = request.await.map(Arc::new);
                    inner.settle(&key, id, generation, &result);
                    result
                }
                .boxed()
                .shared();

                slot.insert((id, shared.clone()));
                shared
            }
        }
    }
}

impl<T> CacheInner<T> {
    fn generation(&self, key: &QueryKey) -> u64 {
        self.generations.get(key).map_or(0, |g| *g)
    }

    fn bump_generation(&self, key: &QueryKey) {
        *self.generations.entry(key.clone()).or_insert(0) += 1;
    }

    fn publish(&self, key: &QueryKey, status: QueryStatus<T>) {
        self.slots
            .entry(key.clone())
            .or_insert_with(|| watch::channel(QueryStatus::Idle).0)
            .send_replace(status);
    }

    fn settle(
        &self,
        key: &QueryKey,
        id: u64,
        generation: u64,
        result: &Result<Arc<T>, CoreError>,
    ) {
        if self.generation(key) != generation {
            debug!(%key, "discarding read that outlived an invalidation");
            return;
        }
        match result {
            Ok(value) => {
                self.fetched_at.insert(key.clone(), Instant::now());
                self.publish(key, QueryStatus::Success(Arc::clone(value)));
            }
            Err(e) => {
                warn!(%key, error = %e, "read failed");
                self.fetched_at.remove(key);
                self.publish(key, QueryStatus::Error(e.clone()));
            }
        }
        self.inflight.remove_if(key, |_, (current, _)| *current == id);
    }
}

// ── QueryClient ─────────────────────────────────────────────────────

/// The console's read cache: one typed `QueryCache` per read family.
///
/// Owned by the `Console`; created at startup and cleared on shutdown.
#[derive(Clone)]
pub struct QueryClient {
    users: QueryCache<Vec<Subscriber>>,
    user_detail: QueryCache<Subscriber>,
    call_duration: QueryCache<CallDuration>,
}

impl QueryClient {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            users: QueryCache::new(stale_time),
            user_detail: QueryCache::new(stale_time),
            call_duration: QueryCache::new(stale_time),
        }
    }

    pub fn users(&self) -> &QueryCache<Vec<Subscriber>> {
        &self.users
    }

    pub fn user_detail(&self) -> &QueryCache<Subscriber> {
        &self.user_detail
    }

    pub fn call_duration(&self) -> &QueryCache<CallDuration> {
        &self.call_duration
    }

    /// Invalidate `key` in whichever cache owns it.
    pub fn invalidate(&self, key: &QueryKey) {
        match key {
            QueryKey::AllUsers => self.users.invalidate(key),
            QueryKey::UserDetail(_) => self.user_detail.invalidate(key),
            QueryKey::CallDuration(_) => self.call_duration.invalidate(key),
        }
    }

    pub fn invalidate_all(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(key);
        }
    }

    pub fn clear(&self) {
        self.users.clear();
        self.user_detail.clear();
        self.call_duration.clear();
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("users", &self.users.keys())
            .field("user_detail", &self.user_detail.keys())
            .field("call_duration", &self.call_duration.keys())
            .finish()
    }
}

//! Keyed query cache with staleness, invalidation and in-flight dedup.
//!
//! SYSTEM CONTEXT
//! ==============
//! Remote reads are cached under hierarchical keys (`["user", "profile"]`).
//! Writes seed the cache directly and then invalidate or drop a whole scope by
//! key prefix. Concurrent fetches of one key share a single network call.
//!
//! Values are stored type-erased so one cache serves every query; typed
//! access goes through [`QueryClient::get_query_data`].

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::net::error::ApiError;
use crate::util::clock::Clock;

/// Hierarchical cache key. A key matches every key it is a prefix of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(pub &'static [&'static str]);

impl QueryKey {
    pub fn starts_with(self, prefix: QueryKey) -> bool {
        self.0.starts_with(prefix.0)
    }
}

/// Every user-scoped entry.
pub const USER_KEY: QueryKey = QueryKey(&["user"]);
/// The signed-in user's profile.
pub const PROFILE_KEY: QueryKey = QueryKey(&["user", "profile"]);

/// Whether a failed fetch is attempted again.
#[derive(Clone, Copy, Debug)]
pub enum RetryPolicy {
    /// Retry while fewer than `n` failures have been retried.
    Count(u32),
    /// As `Count`, but a 401 is final: only a new token can fix it.
    UnlessUnauthorized(u32),
}

impl RetryPolicy {
    pub fn should_retry(self, failure_count: u32, error: &ApiError) -> bool {
        match self {
            RetryPolicy::Count(n) => failure_count < n,
            RetryPolicy::UnlessUnauthorized(n) => error.status() != Some(401) && failure_count < n,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct QueryOptions {
    /// Age after which cached data is refetched on the next load.
    pub stale_time_ms: u64,
    pub retry: RetryPolicy,
}

type Erased = Rc<dyn Any>;
type InFlight = Shared<LocalBoxFuture<'static, Result<Erased, ApiError>>>;

#[derive(Default)]
struct Entry {
    data: Option<Erased>,
    updated_at: Option<u64>,
    invalidated: bool,
    error: Option<ApiError>,
    in_flight: Option<(u64, InFlight)>,
}

pub struct QueryClient {
    entries: RefCell<HashMap<QueryKey, Entry>>,
    clock: Rc<dyn Clock>,
    next_fetch_id: Cell<u64>,
}

impl QueryClient {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self { entries: RefCell::new(HashMap::new()), clock, next_fetch_id: Cell::new(0) }
    }

    /// Cached value for `key`, if one is present and has type `T`.
    pub fn get_query_data<T: Clone + 'static>(&self, key: QueryKey) -> Option<T> {
        let entries = self.entries.borrow();
        entries.get(&key)?.data.as_ref()?.downcast_ref::<T>().cloned()
    }

    /// Seed (`Some`) or null out (`None`) the cached value, marking it fresh.
    pub fn set_query_data<T: 'static>(&self, key: QueryKey, value: Option<T>) {
        let now = self.clock.now_ms();
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key).or_default();
        entry.data = value.map(|v| Rc::new(v) as Erased);
        entry.updated_at = Some(now);
        entry.invalidated = false;
        entry.error = None;
    }

    /// Forget the cached value for `key` while keeping its last error.
    pub fn clear_query_data(&self, key: QueryKey) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(&key) {
            entry.data = None;
        }
    }

    /// Mark every entry under `prefix` stale so the next load refetches it.
    pub fn invalidate_queries(&self, prefix: QueryKey) {
        for (key, entry) in self.entries.borrow_mut().iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
            }
        }
    }

    /// Drop every entry under `prefix`, including any record of in-flight fetches.
    pub fn remove_queries(&self, prefix: QueryKey) {
        self.entries.borrow_mut().retain(|key, _| !key.starts_with(prefix));
    }

    pub fn is_fetching(&self, key: QueryKey) -> bool {
        self.entries.borrow().get(&key).is_some_and(|e| e.in_flight.is_some())
    }

    /// Error from the most recent failed fetch, cleared by the next success.
    pub fn query_error(&self, key: QueryKey) -> Option<ApiError> {
        self.entries.borrow().get(&key).and_then(|e| e.error.clone())
    }

    pub fn is_stale(&self, key: QueryKey, stale_time_ms: u64) -> bool {
        let now = self.clock.now_ms();
        self.entries.borrow().get(&key).is_none_or(|e| match e.updated_at {
            None => true,
            Some(at) => e.invalidated || now.saturating_sub(at) >= stale_time_ms,
        })
    }

    /// Serve `key` from cache when fresh, otherwise fetch it.
    ///
    /// # Errors
    ///
    /// The fetcher's last error once the retry policy gives up.
    pub async fn fetch_query<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> Result<T, ApiError>
    where
        T: Clone + 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        if !self.is_stale(key, options.stale_time_ms) {
            if let Some(cached) = self.get_query_data::<T>(key) {
                return Ok(cached);
            }
        }
        self.refetch_query(key, options, fetcher).await
    }

    /// Fetch `key` from the network regardless of freshness.
    ///
    /// Joins a fetch already in flight for the same key instead of starting
    /// a second one.
    ///
    /// # Errors
    ///
    /// The fetcher's last error once the retry policy gives up.
    pub async fn refetch_query<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> Result<T, ApiError>
    where
        T: Clone + 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let (fetch_id, in_flight) = self.join_or_start(key, options, fetcher);
        let result = in_flight.await;
        self.settle(key, fetch_id, &result);

        let erased = result?;
        erased
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ApiError::unknown(format!("cached value for {:?} has an unexpected type", key.0)))
    }

    fn join_or_start<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> (u64, InFlight)
    where
        T: 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key).or_default();
        if let Some((id, in_flight)) = &entry.in_flight {
            log::debug!("joining in-flight fetch for {:?}", key.0);
            return (*id, in_flight.clone());
        }

        let id = self.next_fetch_id.get() + 1;
        self.next_fetch_id.set(id);
        let in_flight = run_with_retry(key, options.retry, fetcher).boxed_local().shared();
        entry.in_flight = Some((id, in_flight.clone()));
        (id, in_flight)
    }

    fn settle(&self, key: QueryKey, fetch_id: u64, result: &Result<Erased, ApiError>) {
        let now = self.clock.now_ms();
        let mut entries = self.entries.borrow_mut();
        // Entry removed mid-flight (logout): the result is discarded.
        let Some(entry) = entries.get_mut(&key) else {
            return;
        };
        if !entry.in_flight.as_ref().is_some_and(|(id, _)| *id == fetch_id) {
            return;
        }
        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.updated_at = Some(now);
                entry.invalidated = false;
                entry.error = None;
            }
            Err(err) => entry.error = Some(err.clone()),
        }
    }
}

async fn run_with_retry<T, F, Fut>(key: QueryKey, retry: RetryPolicy, fetcher: F) -> Result<Erased, ApiError>
where
    T: 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut failure_count = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(Rc::new(value) as Erased),
            Err(err) => {
                if !retry.should_retry(failure_count, &err) {
                    return Err(err);
                }
                log::debug!("retrying {:?} after failure {}: {err}", key.0, failure_count + 1);
                retry_delay(failure_count).await;
                failure_count += 1;
            }
        }
    }
}

/// Exponential back-off between attempts: 1s, 2s, 4s... capped at 30s.
async fn retry_delay(failure_count: u32) {
    let delay_ms = 1000u32.saturating_mul(1 << failure_count.min(5)).min(30_000);
    #[cfg(feature = "csr")]
    {
        gloo_timers::future::TimeoutFuture::new(delay_ms).await;
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = delay_ms;
    }
}

/// Pending/error bookkeeping for one kind of write. Writes are never retried.
#[derive(Debug, Default)]
pub struct MutationState {
    pending: Cell<bool>,
    error: RefCell<Option<ApiError>>,
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub fn error(&self) -> Option<ApiError> {
        self.error.borrow().clone()
    }

    pub fn reset(&self) {
        self.error.borrow_mut().take();
    }

    /// Run one mutation, tracking pending state and recording its error.
    ///
    /// # Errors
    ///
    /// Whatever `op` fails with.
    pub async fn run<T, Fut>(&self, op: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.error.borrow_mut().take();
        let _pending = PendingFlag::raise(&self.pending);
        let result = op.await;
        if let Err(err) = &result {
            *self.error.borrow_mut() = Some(err.clone());
        }
        result
    }
}

/// Clears a pending flag when dropped, including when the future is dropped mid-await.
pub(crate) struct PendingFlag<'a>(&'a Cell<bool>);

impl<'a> PendingFlag<'a> {
    pub(crate) fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for PendingFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

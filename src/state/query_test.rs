use std::cell::Cell;
use std::future::Future;

use futures::FutureExt;
use futures::executor::block_on;
use futures::future::LocalBoxFuture;

use super::*;
use crate::testing::yield_now;
use crate::util::clock::ManualClock;

// =============================================================
// Helpers
// =============================================================

const OTHER_KEY: QueryKey = QueryKey(&["courses"]);
const USER_SETTINGS_KEY: QueryKey = QueryKey(&["user", "settings"]);

fn client() -> (Rc<ManualClock>, QueryClient) {
    let clock = Rc::new(ManualClock::new(10_000));
    (clock.clone(), QueryClient::new(clock))
}

fn options(stale_time_ms: u64, retry: RetryPolicy) -> QueryOptions {
    QueryOptions { stale_time_ms, retry }
}

fn server_error() -> ApiError {
    ApiError::Network { status: 500, body: None }
}

/// Fetcher that fails `failures` times, then returns `value`, counting calls.
fn flaky(calls: Rc<Cell<u32>>, failures: u32, value: &'static str) -> impl Fn() -> LocalBoxFuture<'static, Result<String, ApiError>> {
    move || {
        let calls = calls.clone();
        async move {
            calls.set(calls.get() + 1);
            if calls.get() <= failures { Err(server_error()) } else { Ok(value.to_owned()) }
        }
        .boxed_local()
    }
}

// =============================================================
// Keys
// =============================================================

#[test]
fn key_prefix_matching() {
    assert!(PROFILE_KEY.starts_with(USER_KEY));
    assert!(USER_KEY.starts_with(USER_KEY));
    assert!(!USER_KEY.starts_with(PROFILE_KEY));
    assert!(!OTHER_KEY.starts_with(USER_KEY));
}

// =============================================================
// Retry policy
// =============================================================

#[test]
fn count_policy_retries_below_limit() {
    let policy = RetryPolicy::Count(1);
    assert!(policy.should_retry(0, &server_error()));
    assert!(!policy.should_retry(1, &server_error()));
}

#[test]
fn unless_unauthorized_never_retries_401() {
    let policy = RetryPolicy::UnlessUnauthorized(1);
    assert!(!policy.should_retry(0, &ApiError::Unauthorized));
    assert!(!policy.should_retry(0, &ApiError::Network { status: 401, body: None }));
    assert!(policy.should_retry(0, &server_error()));
    assert!(!policy.should_retry(1, &server_error()));
}

// =============================================================
// Cache data
// =============================================================

#[test]
fn set_and_get_query_data() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("alice".to_owned()));
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY).as_deref(), Some("alice"));
    assert_eq!(qc.get_query_data::<u32>(PROFILE_KEY), None);
}

#[test]
fn set_query_data_none_nulls_entry() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("alice".to_owned()));
    qc.set_query_data::<String>(PROFILE_KEY, None);
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY), None);
}

#[test]
fn clear_query_data_keeps_error() {
    let (_, qc) = client();
    let calls = Rc::new(Cell::new(0));
    let _ = block_on(qc.refetch_query(PROFILE_KEY, options(0, RetryPolicy::Count(0)), flaky(calls, 1, "never")));
    qc.clear_query_data(PROFILE_KEY);
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY), None);
    assert_eq!(qc.query_error(PROFILE_KEY), Some(server_error()));
}

#[test]
fn invalidate_marks_scope_stale_only() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("alice".to_owned()));
    qc.set_query_data(OTHER_KEY, Some("math".to_owned()));

    qc.invalidate_queries(USER_KEY);
    assert!(qc.is_stale(PROFILE_KEY, 60_000));
    assert!(!qc.is_stale(OTHER_KEY, 60_000));
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY).as_deref(), Some("alice"));
}

#[test]
fn remove_drops_scope_only() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("alice".to_owned()));
    qc.set_query_data(USER_SETTINGS_KEY, Some("dark".to_owned()));
    qc.set_query_data(OTHER_KEY, Some("math".to_owned()));

    qc.remove_queries(USER_KEY);
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY), None);
    assert_eq!(qc.get_query_data::<String>(USER_SETTINGS_KEY), None);
    assert_eq!(qc.get_query_data::<String>(OTHER_KEY).as_deref(), Some("math"));
}

#[test]
fn data_goes_stale_after_stale_time() {
    let (clock, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("alice".to_owned()));
    assert!(!qc.is_stale(PROFILE_KEY, 1_000));
    clock.advance(1_000);
    assert!(qc.is_stale(PROFILE_KEY, 1_000));
}

#[test]
fn missing_entry_is_stale() {
    let (_, qc) = client();
    assert!(qc.is_stale(PROFILE_KEY, u64::MAX));
}

// =============================================================
// Fetching
// =============================================================

#[test]
fn fetch_query_serves_fresh_cache_without_network() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("cached".to_owned()));
    let calls = Rc::new(Cell::new(0));

    let value = block_on(qc.fetch_query(PROFILE_KEY, options(60_000, RetryPolicy::Count(0)), flaky(calls.clone(), 0, "net")));
    assert_eq!(value.unwrap(), "cached");
    assert_eq!(calls.get(), 0);
}

#[test]
fn fetch_query_refetches_invalidated_data() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("cached".to_owned()));
    qc.invalidate_queries(USER_KEY);
    let calls = Rc::new(Cell::new(0));

    let value = block_on(qc.fetch_query(PROFILE_KEY, options(60_000, RetryPolicy::Count(0)), flaky(calls.clone(), 0, "net")));
    assert_eq!(value.unwrap(), "net");
    assert_eq!(calls.get(), 1);
    assert!(!qc.is_stale(PROFILE_KEY, 60_000));
}

#[test]
fn refetch_query_bypasses_fresh_cache() {
    let (_, qc) = client();
    qc.set_query_data(PROFILE_KEY, Some("cached".to_owned()));
    let calls = Rc::new(Cell::new(0));

    let value = block_on(qc.refetch_query(PROFILE_KEY, options(60_000, RetryPolicy::Count(0)), flaky(calls.clone(), 0, "net")));
    assert_eq!(value.unwrap(), "net");
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY).as_deref(), Some("net"));
}

#[test]
fn retry_count_one_recovers_from_single_failure() {
    let (_, qc) = client();
    let calls = Rc::new(Cell::new(0));

    let value = block_on(qc.refetch_query(PROFILE_KEY, options(0, RetryPolicy::Count(1)), flaky(calls.clone(), 1, "ok")));
    assert_eq!(value.unwrap(), "ok");
    assert_eq!(calls.get(), 2);
    assert_eq!(qc.query_error(PROFILE_KEY), None);
}

#[test]
fn failure_is_recorded_and_clears_in_flight() {
    let (_, qc) = client();
    let calls = Rc::new(Cell::new(0));

    let err = block_on(qc.refetch_query(PROFILE_KEY, options(0, RetryPolicy::Count(1)), flaky(calls.clone(), 5, "never")))
        .unwrap_err();
    assert_eq!(err, server_error());
    assert_eq!(calls.get(), 2);
    assert_eq!(qc.query_error(PROFILE_KEY), Some(server_error()));
    assert!(!qc.is_fetching(PROFILE_KEY));
}

#[test]
fn concurrent_fetches_share_one_call() {
    let (_, qc) = client();
    let calls = Rc::new(Cell::new(0));
    let opts = options(0, RetryPolicy::Count(0));

    let fetcher = {
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                calls.set(calls.get() + 1);
                yield_now().await;
                Ok::<_, ApiError>("shared".to_owned())
            }
        }
    };
    let first = qc.refetch_query(PROFILE_KEY, opts, fetcher.clone());
    let second = qc.refetch_query(PROFILE_KEY, opts, fetcher);
    let (a, b) = block_on(futures::future::join(first, second));

    assert_eq!(a.unwrap(), "shared");
    assert_eq!(b.unwrap(), "shared");
    assert_eq!(calls.get(), 1);
    assert!(!qc.is_fetching(PROFILE_KEY));
}

#[test]
fn removal_mid_flight_discards_result() {
    let (_, qc) = client();
    let qc = Rc::new(qc);
    let remover = qc.clone();

    let fetcher = move || {
        remover.remove_queries(USER_KEY);
        async { Ok::<_, ApiError>("late".to_owned()) }
    };
    let value = block_on(qc.refetch_query(PROFILE_KEY, options(0, RetryPolicy::Count(0)), fetcher));
    assert_eq!(value.unwrap(), "late");
    assert_eq!(qc.get_query_data::<String>(PROFILE_KEY), None);
}

// =============================================================
// Mutations
// =============================================================

#[test]
fn mutation_records_error_and_clears_pending() {
    let state = MutationState::default();
    let result: Result<(), ApiError> = block_on(state.run(async { Err(server_error()) }));
    assert!(result.is_err());
    assert!(!state.is_pending());
    assert_eq!(state.error(), Some(server_error()));
}

#[test]
fn mutation_success_clears_previous_error() {
    let state = MutationState::default();
    let _ = block_on(state.run(async { Err::<(), _>(server_error()) }));
    let value = block_on(state.run(async { Ok::<_, ApiError>(7) })).unwrap();
    assert_eq!(value, 7);
    assert_eq!(state.error(), None);
}

#[test]
fn mutation_is_pending_while_running() {
    let state = MutationState::default();
    let observed = Cell::new(false);
    let _ = block_on(state.run(async {
        observed.set(state.is_pending());
        Ok::<_, ApiError>(())
    }));
    assert!(observed.get());
    assert!(!state.is_pending());
}

#[test]
fn dropped_mutation_clears_pending() {
    let state = MutationState::default();
    {
        let fut = state.run(futures::future::pending::<Result<(), ApiError>>());
        let mut fut = Box::pin(fut);
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(fut.as_mut().poll(&mut cx).is_pending());
        assert!(state.is_pending());
    }
    assert!(!state.is_pending());
}

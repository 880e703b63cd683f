//! Unit tests for the resource containers
//!
//! Tests cover:
//! - Cache reuse, forced bypass and TTL expiry
//! - Error handling that keeps previous data
//! - Ordering of overlapping writers
//! - Per-key independence

use core::pin::pin;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::Arc;

use encore_primitives::api::ApiResult;
use encore_primitives::error::{ApiError, ErrorKind};
use futures_util::poll;
use tokio::sync::oneshot;
use tokio::time::advance;

use super::*;

const TTL: Duration = Duration::from_secs(300);

struct Remote {
    calls: AtomicUsize,
}

impl Remote {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    async fn ok(&self, items: Vec<u32>) -> ApiResult<Vec<u32>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(items)
    }

    async fn fail(&self, kind: ErrorKind, message: &str) -> ApiResult<Vec<u32>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ApiError::new(kind, message))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn gated(rx: oneshot::Receiver<ApiResult<Vec<u32>>>) -> ApiResult<Vec<u32>> {
    rx.await.expect("gate dropped")
}

// ============================================================
// Cache validity
// ============================================================

#[test]
fn test_cache_validity_window() {
    let now = tokio::time::Instant::now();

    assert!(!is_cache_valid(None, TTL, now));
    assert!(is_cache_valid(Some(now), TTL, now));
    assert!(is_cache_valid(Some(now), TTL, now + TTL - Duration::from_millis(1)));
    assert!(!is_cache_valid(Some(now), TTL, now + TTL));
    // A timestamp from the future never underflows.
    assert!(is_cache_valid(Some(now + TTL), TTL, now));
}

#[test]
fn test_never_fetched_projects_to_empty() {
    let resource = Resource::<Vec<u32>>::new("numbers", TTL);

    assert!(resource.data().is_empty());
    assert!(!resource.is_loading());
    assert_eq!(resource.error(), None);
    assert_eq!(resource.snapshot().status(), Status::Idle);

    let state = ResourceState::<Vec<u32>>::default();
    assert!(projection::data_of(&state).is_empty());
    assert!(!projection::is_loading(&state));
    assert_eq!(projection::error_of(&state), None);
}

// ============================================================
// Fetch orchestration
// ============================================================

#[tokio::test(start_paused = true)]
async fn test_cached_data_is_reused_within_ttl() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let first = resource.fetch(false, || remote.ok(vec![1, 2])).await;
    advance(Duration::from_secs(60)).await;
    let second = resource.fetch(false, || remote.ok(vec![3])).await;

    assert_eq!(first, Ok(vec![1, 2]));
    assert_eq!(second, Ok(vec![1, 2]));
    assert_eq!(remote.calls(), 1);
    assert_eq!(resource.snapshot().status(), Status::Success);
}

#[tokio::test(start_paused = true)]
async fn test_forced_fetch_bypasses_cache() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let _ = resource.fetch(false, || remote.ok(vec![1])).await;
    let forced = resource.fetch(true, || remote.ok(vec![2])).await;

    assert_eq!(forced, Ok(vec![2]));
    assert_eq!(remote.calls(), 2);
    assert_eq!(resource.data(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_expired_cache_goes_to_network() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let _ = resource.fetch(false, || remote.ok(vec![1])).await;
    advance(TTL).await;
    let refreshed = resource.fetch(false, || remote.ok(vec![2])).await;

    assert_eq!(refreshed, Ok(vec![2]));
    assert_eq!(remote.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_forces_next_fetch() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let _ = resource.fetch(false, || remote.ok(vec![1])).await;
    resource.invalidate();

    assert_eq!(resource.data(), vec![1], "invalidation keeps the data");
    assert_eq!(resource.cached(), None);

    let _ = resource.fetch(false, || remote.ok(vec![2])).await;
    assert_eq!(remote.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_previous_data() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let _ = resource.fetch(false, || remote.ok(vec![1, 2])).await;
    let fetched_at = resource.snapshot().last_fetched_at();

    let err = resource
        .fetch(true, || remote.fail(ErrorKind::ServerError, "Backend down"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(resource.data(), vec![1, 2]);
    assert_eq!(resource.snapshot().status(), Status::Error);
    assert_eq!(resource.error().as_deref(), Some("Backend down"));
    assert_eq!(resource.snapshot().last_fetched_at(), fetched_at);
}

#[tokio::test(start_paused = true)]
async fn test_success_clears_previous_error() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let _ = resource
        .fetch(true, || remote.fail(ErrorKind::Network, "offline"))
        .await;
    assert!(resource.error().is_some());

    let _ = resource.fetch(false, || remote.ok(vec![7])).await;

    assert_eq!(resource.error(), None);
    assert_eq!(resource.snapshot().status(), Status::Success);
}

#[tokio::test(start_paused = true)]
async fn test_loading_is_visible_while_in_flight() {
    let resource = Resource::new("numbers", TTL);
    let (tx, rx) = oneshot::channel();
    let mut updates = resource.subscribe();

    let mut fetch = pin!(resource.fetch(true, || gated(rx)));
    assert!(poll!(&mut fetch).is_pending());

    assert!(resource.is_loading());
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().status(), Status::Loading);

    tx.send(Ok(vec![1])).unwrap();
    assert_eq!(fetch.await, Ok(vec![1]));

    assert!(!resource.is_loading());
    assert_eq!(updates.borrow_and_update().data(), Some(&vec![1]));
}

// ============================================================
// Writer ordering
// ============================================================

#[tokio::test(start_paused = true)]
async fn test_older_fetch_does_not_overwrite_newer() {
    let resource = Resource::new("numbers", TTL);
    let (tx_old, rx_old) = oneshot::channel();
    let (tx_new, rx_new) = oneshot::channel();

    let mut older = pin!(resource.fetch(true, || gated(rx_old)));
    let mut newer = pin!(resource.fetch(true, || gated(rx_new)));
    assert!(poll!(&mut older).is_pending());
    assert!(poll!(&mut newer).is_pending());

    tx_new.send(Ok(vec![2])).unwrap();
    assert_eq!(newer.await, Ok(vec![2]));

    tx_old.send(Ok(vec![1])).unwrap();
    // The caller still gets its own outcome.
    assert_eq!(older.await, Ok(vec![1]));

    assert_eq!(resource.data(), vec![2]);
    assert_eq!(resource.snapshot().status(), Status::Success);
}

#[tokio::test(start_paused = true)]
async fn test_older_failure_does_not_mark_newer_success_as_error() {
    let resource = Resource::new("numbers", TTL);
    let (tx_old, rx_old) = oneshot::channel();
    let (tx_new, rx_new) = oneshot::channel();

    let mut older = pin!(resource.fetch(true, || gated(rx_old)));
    let mut newer = pin!(resource.fetch(true, || gated(rx_new)));
    assert!(poll!(&mut older).is_pending());
    assert!(poll!(&mut newer).is_pending());

    tx_new.send(Ok(vec![2])).unwrap();
    let _ = newer.await;
    tx_old
        .send(Err(ApiError::from_kind(ErrorKind::Timeout)))
        .unwrap();
    assert!(older.await.is_err());

    assert_eq!(resource.error(), None);
    assert_eq!(resource.snapshot().status(), Status::Success);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_started_before_local_edit_is_discarded() {
    let resource = Resource::new("numbers", TTL);
    let (tx, rx) = oneshot::channel();

    let mut fetch = pin!(resource.fetch(true, || gated(rx)));
    assert!(poll!(&mut fetch).is_pending());

    resource.apply(|items: &mut Vec<u32>| items.push(9));
    tx.send(Ok(vec![1])).unwrap();
    let _ = fetch.await;

    assert_eq!(resource.data(), vec![9]);
    // Nothing in flight any more, and the edit never counted as a fetch.
    assert_eq!(resource.snapshot().status(), Status::Idle);
    assert_eq!(resource.snapshot().last_fetched_at(), None);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_started_after_local_edit_is_applied() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    resource.apply(|items: &mut Vec<u32>| items.push(9));
    let _ = resource.fetch(true, || remote.ok(vec![1, 2])).await;

    assert_eq!(resource.data(), vec![1, 2]);
    assert_eq!(resource.snapshot().status(), Status::Success);
}

#[tokio::test(start_paused = true)]
async fn test_local_edit_keeps_status_and_fetch_time() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();

    let _ = resource.fetch(false, || remote.ok(vec![1])).await;
    let before = resource.snapshot();

    resource.apply(|items: &mut Vec<u32>| items.clear());
    let after = resource.snapshot();

    assert_eq!(after.data(), Some(&vec![]));
    assert_eq!(after.status(), before.status());
    assert_eq!(after.last_fetched_at(), before.last_fetched_at());
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_fetch_in_flight() {
    let resource = Resource::new("numbers", TTL);
    let remote = Remote::new();
    let (tx, rx) = oneshot::channel();

    let _ = resource.fetch(false, || remote.ok(vec![1])).await;

    let mut fetch = pin!(resource.fetch(true, || gated(rx)));
    assert!(poll!(&mut fetch).is_pending());

    resource.reset();
    tx.send(Ok(vec![2])).unwrap();
    let _ = fetch.await;

    assert_eq!(resource.snapshot(), ResourceState::default());
}

// ============================================================
// Per-key cache
// ============================================================

#[tokio::test(start_paused = true)]
async fn test_keys_fetch_independently() {
    let keyed = KeyedResource::<String, Vec<u32>>::new("per_key", TTL);
    let remote = Remote::new();
    let (tx, rx) = oneshot::channel();
    let alice = "alice".to_owned();
    let bob = "bob".to_owned();

    let mut slow = pin!(keyed.fetch(&alice, false, || gated(rx)));
    assert!(poll!(&mut slow).is_pending());

    let fast = keyed.fetch(&bob, false, || remote.ok(vec![2])).await;

    assert_eq!(fast, Ok(vec![2]));
    assert!(keyed.is_loading(&alice));
    assert!(!keyed.is_loading(&bob));
    assert_eq!(keyed.data_of(&bob), vec![2]);

    tx.send(Ok(vec![1])).unwrap();
    let _ = slow.await;

    assert_eq!(keyed.data_of(&alice), vec![1]);
    assert_eq!(keyed.data_of(&bob), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_each_key_has_its_own_ttl() {
    let keyed = KeyedResource::<String, Vec<u32>>::new("per_key", TTL);
    let remote = Remote::new();
    let alice = "alice".to_owned();
    let bob = "bob".to_owned();

    let _ = keyed.fetch(&alice, false, || remote.ok(vec![1])).await;
    advance(Duration::from_secs(180)).await;
    let _ = keyed.fetch(&bob, false, || remote.ok(vec![2])).await;
    advance(Duration::from_secs(180)).await;

    let _ = keyed.fetch(&alice, false, || remote.ok(vec![10])).await;
    let _ = keyed.fetch(&bob, false, || remote.ok(vec![20])).await;

    assert_eq!(remote.calls(), 3, "only alice's entry had expired");
    assert_eq!(keyed.data_of(&alice), vec![10]);
    assert_eq!(keyed.data_of(&bob), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_key_projects_to_empty() {
    let keyed = KeyedResource::<String, Vec<u32>>::new("per_key", TTL);
    let carol = "carol".to_owned();

    assert!(keyed.data_of(&carol).is_empty());
    assert!(!keyed.is_loading(&carol));
    assert_eq!(keyed.error_of(&carol), None);
    assert!(keyed.is_empty(), "reads must not create entries");
}

#[tokio::test(start_paused = true)]
async fn test_clear_drops_every_key() {
    let keyed = KeyedResource::<String, Vec<u32>>::new("per_key", TTL);
    let remote = Remote::new();

    let _ = keyed.fetch(&"a".to_owned(), false, || remote.ok(vec![1])).await;
    let _ = keyed.fetch(&"b".to_owned(), false, || remote.ok(vec![2])).await;
    assert_eq!(keyed.len(), 2);

    keyed.clear();

    assert!(keyed.is_empty());
    assert!(keyed.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_entry_is_shared_per_key() {
    let keyed = KeyedResource::<String, Vec<u32>>::new("per_key", TTL);

    let a = keyed.entry(&"dave".to_owned());
    let b = keyed.entry(&"dave".to_owned());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(keyed.keys(), vec!["dave".to_owned()]);
}

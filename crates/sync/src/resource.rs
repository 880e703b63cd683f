//! A single cached resource and the fetch orchestration around it.

use core::future::Future;
use core::mem;
use core::time::Duration;

use encore_primitives::api::ApiResult;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::projection;
use crate::state::{is_cache_valid, ResourceState, Status};

/// Orders the writers of one resource.
///
/// Every write takes a ticket when it is invoked. A fetch result is applied
/// only if no write invoked after it has been applied already.
#[derive(Debug, Default)]
struct WriteLedger {
    issued: u64,
    applied: u64,
    in_flight: usize,
    /// Status to fall back to when the last in-flight fetch is discarded.
    settled: Status,
}

impl WriteLedger {
    fn next_ticket(&mut self) -> u64 {
        self.issued = self.issued.saturating_add(1);
        self.issued
    }
}

/// Container for one cached collection or value.
///
/// Reads never wait on writers. Writers are serialized by the resource's own
/// ledger; different resources never contend.
#[derive(Debug)]
pub struct Resource<T> {
    name: &'static str,
    ttl: Duration,
    state: watch::Sender<ResourceState<T>>,
    ledger: Mutex<WriteLedger>,
}

impl<T> Resource<T>
where
    T: Clone + Send + Sync,
{
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        let (state, _) = watch::channel(ResourceState::default());

        Self {
            name,
            ttl,
            state,
            ledger: Mutex::new(WriteLedger::default()),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Copy of the current envelope.
    pub fn snapshot(&self) -> ResourceState<T> {
        self.state.borrow().clone()
    }

    /// Change notifications for rendering consumers.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state.subscribe()
    }

    /// Current data, or the empty value if never fetched.
    pub fn data(&self) -> T
    where
        T: Default,
    {
        projection::data_of(&self.state.borrow())
    }

    pub fn is_loading(&self) -> bool {
        projection::is_loading(&self.state.borrow())
    }

    pub fn error(&self) -> Option<String> {
        projection::error_of(&self.state.borrow())
    }

    /// Cached data, if present and still within the TTL.
    pub fn cached(&self) -> Option<T> {
        let state = self.state.borrow();

        if is_cache_valid(state.last_fetched_at(), self.ttl, Instant::now()) {
            state.data().cloned()
        } else {
            None
        }
    }

    /// Serves cached data or fetches through `remote`.
    ///
    /// With `force` the cache is bypassed. On success the data is replaced
    /// wholesale; on failure the previous data is kept and the error recorded.
    /// The result of a fetch superseded by a later write is returned to its
    /// caller but not written to the container.
    pub async fn fetch<F, Fut>(&self, force: bool, remote: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        if !force {
            if let Some(data) = self.cached() {
                debug!(resource = self.name, "Serving cached data");
                return Ok(data);
            }
        }

        let ticket = self.begin_fetch();
        let outcome = remote().await;
        self.complete_fetch(ticket, outcome)
    }

    /// Applies a local edit ahead of a remote call.
    ///
    /// Counts as a write: fetches invoked before it will not overwrite it.
    pub fn apply<F>(&self, edit: F)
    where
        T: Default,
        F: FnOnce(&mut T),
    {
        let mut ledger = self.ledger.lock();
        ledger.applied = ledger.next_ticket();
        self.transition(|state| state.speculative(edit));
    }

    /// Marks the data stale without discarding it.
    pub fn invalidate(&self) {
        let _ledger = self.ledger.lock();
        self.transition(ResourceState::invalidated);
    }

    /// Back to the never-fetched state. Fetches in flight are discarded.
    pub fn reset(&self) {
        let mut ledger = self.ledger.lock();
        ledger.applied = ledger.next_ticket();
        ledger.settled = Status::Idle;
        self.transition(|_| ResourceState::reset());
    }

    fn begin_fetch(&self) -> u64 {
        let mut ledger = self.ledger.lock();
        let ticket = ledger.next_ticket();

        if ledger.in_flight == 0 {
            ledger.settled = self.state.borrow().status();
        }
        ledger.in_flight = ledger.in_flight.saturating_add(1);

        self.transition(ResourceState::loading);

        debug!(resource = self.name, ticket, "Fetch started");

        ticket
    }

    fn complete_fetch(&self, ticket: u64, outcome: ApiResult<T>) -> ApiResult<T> {
        let mut ledger = self.ledger.lock();
        ledger.in_flight = ledger.in_flight.saturating_sub(1);

        if ticket < ledger.applied {
            debug!(
                resource = self.name,
                ticket,
                applied = ledger.applied,
                "Discarding superseded fetch result"
            );

            if ledger.in_flight == 0 {
                let settled = ledger.settled;
                self.transition(|state| state.settled(settled));
            }

            return outcome;
        }

        ledger.applied = ticket;

        match &outcome {
            Ok(data) => {
                let data = data.clone();
                self.transition(|state| state.succeeded(data, Instant::now()));
            }
            Err(err) => {
                debug!(resource = self.name, kind = %err.kind(), %err, "Fetch failed");
                let message = err.message().to_owned();
                self.transition(|state| state.failed(message));
            }
        }

        outcome
    }

    fn transition<F>(&self, f: F)
    where
        F: FnOnce(ResourceState<T>) -> ResourceState<T>,
    {
        self.state.send_modify(|state| *state = f(mem::take(state)));
    }
}

//! The envelope every cached collection lives in.

use core::time::Duration;

use tokio::time::Instant;

/// Lifecycle of a cached resource.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Status {
    /// Never fetched, or reset.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    Success,
    Error,
}

/// `{data, status, error, last_fetched_at}` for one logical collection.
///
/// Transitions consume the envelope and return a new one, so a half-applied
/// state is never observable.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceState<T> {
    data: Option<T>,
    status: Status,
    error: Option<String>,
    last_fetched_at: Option<Instant>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: Status::Idle,
            error: None,
            last_fetched_at: None,
        }
    }
}

impl<T> ResourceState<T> {
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn last_fetched_at(&self) -> Option<Instant> {
        self.last_fetched_at
    }

    /// A fetch has started. Data and the previous error stay visible.
    #[must_use]
    pub fn loading(self) -> Self {
        Self {
            status: Status::Loading,
            ..self
        }
    }

    /// An authoritative fetch landed. Replaces the data wholesale.
    #[must_use]
    pub fn succeeded(self, data: T, at: Instant) -> Self {
        Self {
            data: Some(data),
            status: Status::Success,
            error: None,
            last_fetched_at: Some(at),
        }
    }

    /// A fetch failed. The previous data is kept.
    #[must_use]
    pub fn failed(self, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            error: Some(message.into()),
            ..self
        }
    }

    /// Back to the never-fetched state.
    #[must_use]
    pub fn reset() -> Self {
        Self::default()
    }

    /// Applies a local edit without touching status or fetch time.
    ///
    /// Absent data is edited as the type's empty value.
    #[must_use]
    pub fn speculative(self, edit: impl FnOnce(&mut T)) -> Self
    where
        T: Default,
    {
        let mut data = self.data.unwrap_or_default();
        edit(&mut data);

        Self {
            data: Some(data),
            ..self
        }
    }

    /// Forgets when the data was fetched so the next fetch goes to the network.
    #[must_use]
    pub fn invalidated(self) -> Self {
        Self {
            last_fetched_at: None,
            ..self
        }
    }

    /// Drops out of `Loading` without a result, e.g. when the only in-flight
    /// fetch was superseded.
    #[must_use]
    pub(crate) fn settled(self, status: Status) -> Self {
        if self.status != Status::Loading {
            return self;
        }

        Self { status, ..self }
    }
}

/// Whether data fetched at `last_fetched_at` may still be served at `now`.
#[must_use]
pub fn is_cache_valid(last_fetched_at: Option<Instant>, ttl: Duration, now: Instant) -> bool {
    last_fetched_at.is_some_and(|at| now.saturating_duration_since(at) < ttl)
}

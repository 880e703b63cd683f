//! Sub-collections addressed by an external id, each with its own lifecycle.

use core::future::Future;
use core::hash::Hash;
use core::time::Duration;
use std::sync::Arc;

use dashmap::DashMap;
use encore_primitives::api::ApiResult;

use crate::resource::Resource;
use crate::state::ResourceState;

/// Map of independently cached resources.
///
/// Entries are created on first use and kept for the session. Fetching one
/// key never blocks or invalidates another.
#[derive(Debug)]
pub struct KeyedResource<K, T>
where
    K: Eq + Hash,
{
    name: &'static str,
    ttl: Duration,
    entries: DashMap<K, Arc<Resource<T>>>,
}

impl<K, T> KeyedResource<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone + Default + Send + Sync,
{
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// The resource for `key`, created empty if absent.
    pub fn entry(&self, key: &K) -> Arc<Resource<T>> {
        if let Some(entry) = self.entries.get(key) {
            return Arc::clone(entry.value());
        }

        Arc::clone(
            self.entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Resource::new(self.name, self.ttl)))
                .value(),
        )
    }

    /// Existing resource for `key`, without creating one.
    pub fn get(&self, key: &K) -> Option<Arc<Resource<T>>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub async fn fetch<F, Fut>(&self, key: &K, force: bool, remote: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        // The map guard must not live across the remote call.
        let resource = self.entry(key);
        resource.fetch(force, remote).await
    }

    pub fn snapshot(&self, key: &K) -> ResourceState<T> {
        self.get(key)
            .map(|resource| resource.snapshot())
            .unwrap_or_default()
    }

    pub fn data_of(&self, key: &K) -> T {
        self.get(key)
            .map(|resource| resource.data())
            .unwrap_or_default()
    }

    pub fn is_loading(&self, key: &K) -> bool {
        self.get(key).is_some_and(|resource| resource.is_loading())
    }

    pub fn error_of(&self, key: &K) -> Option<String> {
        self.get(key).and_then(|resource| resource.error())
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every key. In-flight fetches finish against detached resources.
    pub fn clear(&self) {
        for entry in self.entries.iter() {
            entry.value().reset();
        }
        self.entries.clear();
    }
}

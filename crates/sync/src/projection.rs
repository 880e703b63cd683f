//! Read-only views for consumers that only render state.
//!
//! None of these fail: absent data projects to the type's empty value.

use crate::state::{ResourceState, Status};

#[must_use]
pub fn data_of<T>(state: &ResourceState<T>) -> T
where
    T: Clone + Default,
{
    state.data().cloned().unwrap_or_default()
}

#[must_use]
pub fn is_loading<T>(state: &ResourceState<T>) -> bool {
    state.status() == Status::Loading
}

#[must_use]
pub fn error_of<T>(state: &ResourceState<T>) -> Option<String> {
    state.error().map(str::to_owned)
}

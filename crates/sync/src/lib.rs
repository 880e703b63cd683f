//! Client-side resource synchronization for Encore.
//!
//! Remote collections (friends, friend requests, tickets, per-friend ticket
//! sets, search results) are cached in [`Resource`] containers with a fixed
//! time-to-live. Writes are applied locally first, sent to the backend, and
//! then reconciled by refetching the affected collections, which also rolls
//! the local edit back when the backend refused it.
//!
//! Each container orders its own writers: a fetch result never overwrites a
//! write that was invoked after the fetch started.
//!
//! # Example
//!
//! ```rust,ignore
//! use encore_sync::SyncContext;
//!
//! let sync = SyncContext::new(user_id, friend_api, ticket_api, &config.sync);
//! sync.refresh_social(false).await?;
//!
//! let friends = sync.friends().friends().data();
//! sync.tickets().delete_ticket(&ticket_id).await?;
//! ```

pub mod context;
pub mod friends;
pub mod keyed;
pub mod mutation;
pub mod projection;
pub mod resource;
pub mod state;
pub mod tickets;

#[cfg(test)]
mod tests;

pub use context::SyncContext;
pub use friends::{FriendSync, SearchResults};
pub use keyed::KeyedResource;
pub use resource::Resource;
pub use state::{is_cache_valid, ResourceState, Status};
pub use tickets::TicketSync;

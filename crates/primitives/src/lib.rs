//! Shared types for the Encore data layer.
//!
//! Entities (tickets, friends, friend requests), their identifiers, the
//! backend response envelope, the closed error taxonomy, and the collaborator
//! traits the synchronization layer consumes.

pub mod api;
pub mod error;
pub mod friend;
pub mod id;
pub mod response;
pub mod ticket;
pub mod user;

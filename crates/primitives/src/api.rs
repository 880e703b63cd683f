//! Collaborator interfaces consumed by the synchronization layer.
//!
//! The sync layer never talks HTTP itself; it calls these traits. The HTTP
//! implementations live in `encore-client`, tests substitute in-memory ones.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::friend::{Friend, FriendRequest, RequestDecision};
use crate::id::{FriendId, FriendshipId, RequestId, TicketId, UserId};
use crate::ticket::{NewTicket, Page, Ticket, TicketPatch};
use crate::user::UserSummary;

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait FriendApi: Send + Sync {
    async fn list_friends(&self, user_id: &UserId) -> ApiResult<Vec<Friend>>;

    async fn search_users(&self, query: &str) -> ApiResult<Vec<UserSummary>>;

    async fn list_received_requests(&self, user_id: &UserId) -> ApiResult<Vec<FriendRequest>>;

    async fn list_sent_requests(&self, user_id: &UserId) -> ApiResult<Vec<FriendRequest>>;

    async fn send_request(
        &self,
        target: &UserId,
        message: Option<&str>,
    ) -> ApiResult<FriendRequest>;

    async fn respond(&self, request_id: &RequestId, decision: RequestDecision) -> ApiResult<()>;

    async fn remove_friend(&self, friendship_id: &FriendshipId) -> ApiResult<()>;

    async fn cancel_request(&self, request_id: &RequestId) -> ApiResult<()>;

    async fn friend_count(&self, user_id: &UserId) -> ApiResult<u64>;
}

#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn list_mine(&self, user_id: &UserId, page: u32, size: u32) -> ApiResult<Page<Ticket>>;

    async fn create(&self, ticket: &NewTicket) -> ApiResult<Ticket>;

    async fn update(
        &self,
        id: &TicketId,
        user_id: &UserId,
        patch: &TicketPatch,
    ) -> ApiResult<Ticket>;

    async fn delete(&self, id: &TicketId, user_id: &UserId) -> ApiResult<()>;

    async fn list_for_friend(
        &self,
        friend_id: &FriendId,
        page: u32,
        size: u32,
    ) -> ApiResult<Page<Ticket>>;
}

/// Bearer token as handed out by the backend.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AuthToken {
    pub access_token: String,
}

impl AuthToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

/// Where the current bearer token lives.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Option<AuthToken>;

    async fn store(&self, token: AuthToken);

    /// Evicts the token. Called by the transport on any 401.
    async fn clear(&self);
}

//! API client for the Encore backend
//!
//! Implements the friend and ticket collaborator traits over
//! [`ConnectionInfo`].

use async_trait::async_trait;
use encore_primitives::api::{ApiResult, FriendApi, TicketApi, TokenStore};
use encore_primitives::friend::{Friend, FriendRequest, RequestDecision, RequestStatus};
use encore_primitives::id::{FriendId, FriendshipId, RequestId, TicketId, UserId};
use encore_primitives::ticket::{NewTicket, Page, Ticket, TicketPatch};
use encore_primitives::user::UserSummary;
use serde::Serialize;
use url::Url;

use crate::connection::ConnectionInfo;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequestBody<'a> {
    target_user_id: &'a UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RespondBody {
    status: RequestStatus,
}

/// HTTP implementation of [`FriendApi`] and [`TicketApi`].
#[derive(Clone, Debug)]
pub struct Client<S>
where
    S: TokenStore + Clone,
{
    connection: ConnectionInfo<S>,
}

impl<S> Client<S>
where
    S: TokenStore + Clone,
{
    pub const fn new(connection: ConnectionInfo<S>) -> Self {
        Self { connection }
    }

    pub const fn api_url(&self) -> &Url {
        &self.connection.api_url
    }

    pub const fn connection(&self) -> &ConnectionInfo<S> {
        &self.connection
    }
}

#[async_trait]
impl<S> FriendApi for Client<S>
where
    S: TokenStore + Clone,
{
    async fn list_friends(&self, user_id: &UserId) -> ApiResult<Vec<Friend>> {
        self.connection
            .get(&["users", user_id.as_str(), "friends"], &[])
            .await
    }

    async fn search_users(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        self.connection.get(&["friends", "search"], &[("q", query)]).await
    }

    async fn list_received_requests(&self, user_id: &UserId) -> ApiResult<Vec<FriendRequest>> {
        self.connection
            .get(&["users", user_id.as_str(), "friend-requests", "received"], &[])
            .await
    }

    async fn list_sent_requests(&self, user_id: &UserId) -> ApiResult<Vec<FriendRequest>> {
        self.connection
            .get(&["users", user_id.as_str(), "friend-requests", "sent"], &[])
            .await
    }

    async fn send_request(
        &self,
        target: &UserId,
        message: Option<&str>,
    ) -> ApiResult<FriendRequest> {
        let body = SendRequestBody {
            target_user_id: target,
            message,
        };

        self.connection.post(&["friend-requests"], &body).await
    }

    async fn respond(&self, request_id: &RequestId, decision: RequestDecision) -> ApiResult<()> {
        let body = RespondBody {
            status: decision.status(),
        };

        self.connection
            .patch(&["friend-requests", request_id.as_str()], &body)
            .await
    }

    async fn remove_friend(&self, friendship_id: &FriendshipId) -> ApiResult<()> {
        self.connection
            .delete(&["friendships", friendship_id.as_str()], &[])
            .await
    }

    async fn cancel_request(&self, request_id: &RequestId) -> ApiResult<()> {
        self.connection
            .delete(&["friend-requests", request_id.as_str()], &[])
            .await
    }

    async fn friend_count(&self, user_id: &UserId) -> ApiResult<u64> {
        self.connection
            .get(&["users", user_id.as_str(), "friends", "count"], &[])
            .await
    }
}

#[async_trait]
impl<S> TicketApi for Client<S>
where
    S: TokenStore + Clone,
{
    async fn list_mine(&self, user_id: &UserId, page: u32, size: u32) -> ApiResult<Page<Ticket>> {
        let (page, size) = (page.to_string(), size.to_string());

        self.connection
            .get(
                &["users", user_id.as_str(), "tickets"],
                &[("page", page.as_str()), ("size", size.as_str())],
            )
            .await
    }

    async fn create(&self, ticket: &NewTicket) -> ApiResult<Ticket> {
        self.connection.post(&["tickets"], ticket).await
    }

    async fn update(
        &self,
        id: &TicketId,
        user_id: &UserId,
        patch: &TicketPatch,
    ) -> ApiResult<Ticket> {
        self.connection
            .put(
                &["tickets", id.as_str()],
                &[("userId", user_id.as_str())],
                patch,
            )
            .await
    }

    async fn delete(&self, id: &TicketId, user_id: &UserId) -> ApiResult<()> {
        self.connection
            .delete(&["tickets", id.as_str()], &[("userId", user_id.as_str())])
            .await
    }

    async fn list_for_friend(
        &self,
        friend_id: &FriendId,
        page: u32,
        size: u32,
    ) -> ApiResult<Page<Ticket>> {
        let (page, size) = (page.to_string(), size.to_string());

        self.connection
            .get(
                &["users", friend_id.as_str(), "tickets", "public"],
                &[("page", page.as_str()), ("size", size.as_str())],
            )
            .await
    }
}

//! Friends, friend requests, friend count and user search.

use core::fmt;
use std::sync::Arc;

use chrono::Utc;
use encore_config::TtlConfig;
use encore_primitives::api::{ApiResult, FriendApi};
use encore_primitives::error::{ApiError, ErrorKind};
use encore_primitives::friend::{Friend, FriendRequest, RequestDecision};
use encore_primitives::id::{FriendshipId, RequestId, UserId};
use encore_primitives::user::UserSummary;
use futures_util::join;
use tracing::debug;

use crate::mutation::{finish, log_reconcile, PendingIds};
use crate::resource::Resource;

/// Hits for one query. The query is stored with its results so a cached
/// answer is never served for a different query.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub users: Vec<UserSummary>,
}

/// Social graph of the signed-in user.
pub struct FriendSync {
    user_id: UserId,
    api: Arc<dyn FriendApi>,
    friends: Resource<Vec<Friend>>,
    received: Resource<Vec<FriendRequest>>,
    sent: Resource<Vec<FriendRequest>>,
    count: Resource<u64>,
    search: Resource<SearchResults>,
    pending: PendingIds,
}

impl fmt::Debug for FriendSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FriendSync")
            .field("user_id", &self.user_id)
            .field("friends", &self.friends)
            .field("received", &self.received)
            .field("sent", &self.sent)
            .field("count", &self.count)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl FriendSync {
    #[must_use]
    pub fn new(user_id: UserId, api: Arc<dyn FriendApi>, ttl: &TtlConfig) -> Self {
        Self {
            user_id,
            api,
            friends: Resource::new("friends", ttl.friends),
            received: Resource::new("received_requests", ttl.friend_requests),
            sent: Resource::new("sent_requests", ttl.friend_requests),
            count: Resource::new("friend_count", ttl.friend_count),
            search: Resource::new("search_results", ttl.search),
            pending: PendingIds::new(),
        }
    }

    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub const fn friends(&self) -> &Resource<Vec<Friend>> {
        &self.friends
    }

    pub const fn received_requests(&self) -> &Resource<Vec<FriendRequest>> {
        &self.received
    }

    pub const fn sent_requests(&self) -> &Resource<Vec<FriendRequest>> {
        &self.sent
    }

    pub const fn friend_count(&self) -> &Resource<u64> {
        &self.count
    }

    pub const fn search_results(&self) -> &Resource<SearchResults> {
        &self.search
    }

    pub async fn fetch_friends(&self, force: bool) -> ApiResult<Vec<Friend>> {
        self.friends
            .fetch(force, || self.api.list_friends(&self.user_id))
            .await
    }

    pub async fn fetch_received_requests(&self, force: bool) -> ApiResult<Vec<FriendRequest>> {
        self.received
            .fetch(force, || self.api.list_received_requests(&self.user_id))
            .await
    }

    pub async fn fetch_sent_requests(&self, force: bool) -> ApiResult<Vec<FriendRequest>> {
        self.sent
            .fetch(force, || self.api.list_sent_requests(&self.user_id))
            .await
    }

    pub async fn fetch_friend_count(&self, force: bool) -> ApiResult<u64> {
        self.count
            .fetch(force, || self.api.friend_count(&self.user_id))
            .await
    }

    /// Searches users by name or external id.
    ///
    /// A blank query clears the results without a network call. Cached results
    /// are reused only for the same query.
    pub async fn search_users(&self, query: &str, force: bool) -> ApiResult<Vec<UserSummary>> {
        let query = query.trim();

        if query.is_empty() {
            self.search.reset();
            return Ok(Vec::new());
        }

        let same_query = self
            .search
            .snapshot()
            .data()
            .is_some_and(|results| results.query == query);

        let results = self
            .search
            .fetch(force || !same_query, || async move {
                self.api
                    .search_users(query)
                    .await
                    .map(|users| SearchResults {
                        query: query.to_owned(),
                        users,
                    })
            })
            .await?;

        Ok(results.users)
    }

    /// Sends a friend request to `target`.
    ///
    /// A placeholder shows up in the sent requests right away, with display
    /// fields taken from the current search results when `target` is in them.
    pub async fn send_request(
        &self,
        target: &UserId,
        message: Option<String>,
    ) -> ApiResult<FriendRequest> {
        if *target == self.user_id {
            return Err(ApiError::new(
                ErrorKind::Validation,
                "Cannot send a friend request to yourself",
            ));
        }

        debug!(target_id = %target, "Sending friend request");

        let placeholder = {
            let search = self.search.snapshot();
            let profile = search
                .data()
                .and_then(|results| results.users.iter().find(|user| user.id == *target));

            FriendRequest::outgoing(
                RequestId::pending(self.pending.next()),
                self.user_id.clone(),
                target.clone(),
                profile,
                message.clone(),
                Utc::now(),
            )
        };
        self.sent.apply(|sent| sent.push(placeholder));

        let outcome = self.api.send_request(target, message.as_deref()).await;

        log_reconcile(
            "send_request",
            self.sent.name(),
            &self.fetch_sent_requests(true).await,
        );

        finish("send_request", outcome)
    }

    /// Accepts or rejects a received request.
    ///
    /// Accepting moves the sender into the friends list locally before the
    /// backend confirms it.
    pub async fn respond(&self, request_id: &RequestId, decision: RequestDecision) -> ApiResult<()> {
        debug!(%request_id, ?decision, "Responding to friend request");

        let mut answered = None;
        self.received.apply(|received| {
            if let Some(pos) = received.iter().position(|r| r.id == *request_id) {
                answered = Some(received.remove(pos));
            }
        });

        if decision == RequestDecision::Accept {
            if let Some(request) = answered {
                let friend = Friend::from_accepted(&request, Utc::now());
                let mut added = false;

                self.friends.apply(|friends| {
                    if !friends.iter().any(|f| f.id == friend.id) {
                        friends.push(friend);
                        added = true;
                    }
                });

                if added {
                    self.count.apply(|count| *count = count.saturating_add(1));
                }
            }
        }

        let outcome = self.api.respond(request_id, decision).await;

        match decision {
            RequestDecision::Accept => {
                let (received, friends, count) = join!(
                    self.fetch_received_requests(true),
                    self.fetch_friends(true),
                    self.fetch_friend_count(true),
                );
                log_reconcile("respond", self.received.name(), &received);
                log_reconcile("respond", self.friends.name(), &friends);
                log_reconcile("respond", self.count.name(), &count);
            }
            RequestDecision::Reject => {
                log_reconcile(
                    "respond",
                    self.received.name(),
                    &self.fetch_received_requests(true).await,
                );
            }
        }

        finish("respond", outcome)
    }

    pub async fn accept_request(&self, request_id: &RequestId) -> ApiResult<()> {
        self.respond(request_id, RequestDecision::Accept).await
    }

    pub async fn reject_request(&self, request_id: &RequestId) -> ApiResult<()> {
        self.respond(request_id, RequestDecision::Reject).await
    }

    /// Ends the friendship identified by `friendship_id`.
    pub async fn remove_friend(&self, friendship_id: &FriendshipId) -> ApiResult<()> {
        debug!(%friendship_id, "Removing friend");

        let mut removed = false;
        self.friends.apply(|friends| {
            let before = friends.len();
            friends.retain(|f| f.friendship_id.as_ref() != Some(friendship_id));
            removed = friends.len() != before;
        });

        if removed {
            self.count.apply(|count| *count = count.saturating_sub(1));
        }

        let outcome = self.api.remove_friend(friendship_id).await;

        let (friends, count) = join!(self.fetch_friends(true), self.fetch_friend_count(true));
        log_reconcile("remove_friend", self.friends.name(), &friends);
        log_reconcile("remove_friend", self.count.name(), &count);

        finish("remove_friend", outcome)
    }

    /// Withdraws a request this user sent.
    pub async fn cancel_request(&self, request_id: &RequestId) -> ApiResult<()> {
        if request_id.is_pending() {
            return Err(ApiError::new(
                ErrorKind::Validation,
                "Friend request has not been sent yet",
            ));
        }

        debug!(%request_id, "Cancelling friend request");

        self.sent.apply(|sent| sent.retain(|r| r.id != *request_id));

        let outcome = self.api.cancel_request(request_id).await;

        log_reconcile(
            "cancel_request",
            self.sent.name(),
            &self.fetch_sent_requests(true).await,
        );

        finish("cancel_request", outcome)
    }

    /// Forgets everything. In-flight fetches are discarded when they land.
    pub fn reset(&self) {
        self.friends.reset();
        self.received.reset();
        self.sent.reset();
        self.count.reset();
        self.search.reset();
    }
}

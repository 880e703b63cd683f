use std::sync::Arc;

use encore_config::SyncConfig;
use encore_primitives::api::{ApiResult, FriendApi, TicketApi};
use encore_primitives::id::UserId;
use futures_util::join;
use tracing::info;

use crate::friends::FriendSync;
use crate::tickets::TicketSync;

/// Every cached collection of one signed-in session.
///
/// Built once per sign-in with the collaborators it talks to. Dropping it, or
/// calling [`SyncContext::reset`] on sign-out, discards all cached state.
#[derive(Debug)]
pub struct SyncContext {
    user_id: UserId,
    friends: FriendSync,
    tickets: TicketSync,
}

impl SyncContext {
    #[must_use]
    pub fn new(
        user_id: UserId,
        friend_api: Arc<dyn FriendApi>,
        ticket_api: Arc<dyn TicketApi>,
        config: &SyncConfig,
    ) -> Self {
        info!(%user_id, page_size = config.page_size, "Starting sync session");

        Self {
            friends: FriendSync::new(user_id.clone(), friend_api, &config.ttl),
            tickets: TicketSync::new(user_id.clone(), ticket_api, config),
            user_id,
        }
    }

    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub const fn friends(&self) -> &FriendSync {
        &self.friends
    }

    pub const fn tickets(&self) -> &TicketSync {
        &self.tickets
    }

    /// Loads friends, both request lists and the friend count concurrently.
    ///
    /// Every fetch runs to completion; the first failure is returned.
    pub async fn refresh_social(&self, force: bool) -> ApiResult<()> {
        let (friends, received, sent, count) = join!(
            self.friends.fetch_friends(force),
            self.friends.fetch_received_requests(force),
            self.friends.fetch_sent_requests(force),
            self.friends.fetch_friend_count(force),
        );

        friends?;
        received?;
        sent?;
        count?;

        Ok(())
    }

    /// Drops every cached collection, e.g. on sign-out.
    pub fn reset(&self) {
        info!(user_id = %self.user_id, "Resetting sync session");

        self.friends.reset();
        self.tickets.reset();
    }
}

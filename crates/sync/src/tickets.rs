//! The user's own ticket diary and friends' public tickets.

use core::fmt;
use std::sync::Arc;

use chrono::Utc;
use encore_config::SyncConfig;
use encore_primitives::api::{ApiResult, TicketApi};
use encore_primitives::error::{ApiError, ErrorKind};
use encore_primitives::id::{FriendId, TicketId, UserId};
use encore_primitives::ticket::{NewTicket, Ticket, TicketPatch};
use tracing::debug;

use crate::keyed::KeyedResource;
use crate::mutation::{finish, log_reconcile, PendingIds};
use crate::resource::Resource;

/// Collections are always fetched from the first page.
pub const FIRST_PAGE: u32 = 0;

pub struct TicketSync {
    user_id: UserId,
    api: Arc<dyn TicketApi>,
    page_size: u32,
    mine: Resource<Vec<Ticket>>,
    friends: KeyedResource<FriendId, Vec<Ticket>>,
    pending: PendingIds,
}

impl fmt::Debug for TicketSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketSync")
            .field("user_id", &self.user_id)
            .field("page_size", &self.page_size)
            .field("mine", &self.mine)
            .field("friends", &self.friends)
            .finish_non_exhaustive()
    }
}

impl TicketSync {
    #[must_use]
    pub fn new(user_id: UserId, api: Arc<dyn TicketApi>, config: &SyncConfig) -> Self {
        Self {
            user_id,
            api,
            page_size: config.page_size,
            mine: Resource::new("my_tickets", config.ttl.tickets),
            friends: KeyedResource::new("friend_tickets", config.ttl.friend_tickets),
            pending: PendingIds::new(),
        }
    }

    pub const fn my_tickets(&self) -> &Resource<Vec<Ticket>> {
        &self.mine
    }

    pub const fn friend_tickets(&self) -> &KeyedResource<FriendId, Vec<Ticket>> {
        &self.friends
    }

    pub async fn fetch_my_tickets(&self, force: bool) -> ApiResult<Vec<Ticket>> {
        self.mine
            .fetch(force, || async move {
                self.api
                    .list_mine(&self.user_id, FIRST_PAGE, self.page_size)
                    .await
                    .map(|page| page.items)
            })
            .await
    }

    /// Public tickets of one friend, cached per friend.
    pub async fn fetch_friend_tickets(
        &self,
        friend_id: &FriendId,
        force: bool,
    ) -> ApiResult<Vec<Ticket>> {
        self.friends
            .fetch(friend_id, force, || async move {
                self.api
                    .list_for_friend(friend_id, FIRST_PAGE, self.page_size)
                    .await
                    .map(|page| page.items)
            })
            .await
    }

    /// Records a new ticket. A placeholder with a pending id is prepended to
    /// the user's tickets until the backend's copy replaces it.
    pub async fn create_ticket(&self, draft: NewTicket) -> ApiResult<Ticket> {
        let draft = NewTicket {
            user_id: self.user_id.clone(),
            ..draft
        };
        let placeholder = Ticket::pending(
            TicketId::pending(self.pending.next()),
            self.user_id.clone(),
            &draft,
            Utc::now(),
        );

        debug!(ticket_id = %placeholder.id, title = %draft.title, "Creating ticket");

        self.mine.apply(|tickets| tickets.insert(0, placeholder));

        let outcome = self.api.create(&draft).await;

        log_reconcile(
            "create_ticket",
            self.mine.name(),
            &self.fetch_my_tickets(true).await,
        );

        finish("create_ticket", outcome)
    }

    /// Patches one of the user's tickets. An empty patch is refused without
    /// contacting the backend.
    pub async fn update_ticket(&self, id: &TicketId, patch: TicketPatch) -> ApiResult<Ticket> {
        ensure_saved(id)?;

        if patch.is_empty() {
            return Err(ApiError::new(ErrorKind::Validation, "Nothing to update"));
        }

        debug!(ticket_id = %id, "Updating ticket");

        let now = Utc::now();
        self.mine.apply(|tickets| {
            if let Some(ticket) = tickets.iter_mut().find(|t| t.id == *id) {
                patch.apply_to(ticket, now);
            }
        });

        let outcome = self.api.update(id, &self.user_id, &patch).await;

        log_reconcile(
            "update_ticket",
            self.mine.name(),
            &self.fetch_my_tickets(true).await,
        );

        finish("update_ticket", outcome)
    }

    pub async fn delete_ticket(&self, id: &TicketId) -> ApiResult<()> {
        ensure_saved(id)?;

        debug!(ticket_id = %id, "Deleting ticket");

        self.mine.apply(|tickets| tickets.retain(|t| t.id != *id));

        let outcome = self.api.delete(id, &self.user_id).await;

        log_reconcile(
            "delete_ticket",
            self.mine.name(),
            &self.fetch_my_tickets(true).await,
        );

        finish("delete_ticket", outcome)
    }

    pub fn reset(&self) {
        self.mine.reset();
        self.friends.clear();
    }
}

/// Pending tickets have no backend counterpart to address yet.
fn ensure_saved(id: &TicketId) -> ApiResult<()> {
    if id.is_pending() {
        return Err(ApiError::new(
            ErrorKind::Validation,
            "Ticket has not been saved yet",
        ));
    }

    Ok(())
}

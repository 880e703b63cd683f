use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{FriendId, FriendshipId, RequestId, UserId};
use crate::user::UserSummary;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: FriendId,
    pub external_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub friendship_id: Option<FriendshipId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friend {
    /// The friend entry an accepted request turns into, before the backend
    /// has assigned a friendship id.
    #[must_use]
    pub fn from_accepted(request: &FriendRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: request.from_user_id.clone(),
            external_id: request.external_id.clone(),
            display_name: request.display_name.clone(),
            avatar_url: request.avatar_url.clone(),
            friendship_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Answer to a received friend request.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestDecision {
    Accept,
    Reject,
}

impl RequestDecision {
    #[must_use]
    pub const fn status(self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: RequestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Display name of the other party.
    pub display_name: String,
    pub external_id: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    /// Placeholder for a request that has been sent but not yet confirmed.
    ///
    /// `target` supplies the display fields when the recipient is known from
    /// a search; otherwise the recipient's id stands in for them.
    #[must_use]
    pub fn outgoing(
        id: RequestId,
        from: UserId,
        to: UserId,
        target: Option<&UserSummary>,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let (display_name, external_id, avatar_url) = target.map_or_else(
            || (to.to_string(), to.to_string(), None),
            |user| {
                (
                    user.display_name.clone(),
                    user.external_id.clone(),
                    user.avatar_url.clone(),
                )
            },
        );

        Self {
            id,
            from_user_id: from,
            to_user_id: to,
            display_name,
            external_id,
            avatar_url,
            status: RequestStatus::Pending,
            message,
            created_at: now,
            updated_at: now,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{TicketId, UserId};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub owner_id: UserId,
    pub title: String,
    pub artist: String,
    pub venue: String,
    #[serde(default)]
    pub seat: Option<String>,
    pub performed_at: DateTime<Utc>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Local stand-in for a ticket whose creation has not been confirmed yet.
    #[must_use]
    pub fn pending(id: TicketId, owner_id: UserId, draft: &NewTicket, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            title: draft.title.clone(),
            artist: draft.artist.clone(),
            venue: draft.venue.clone(),
            seat: draft.seat.clone(),
            performed_at: draft.performed_at,
            genre: draft.genre.clone(),
            visibility: draft.visibility,
            images: draft.images.clone(),
            review: draft.review.clone().map(|text| Review {
                text,
                created_at: now,
            }),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a ticket.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub user_id: UserId,
    pub title: String,
    pub artist: String,
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    pub performed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

/// Partial update of a ticket. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl TicketPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patches `ticket` in place and bumps its `updated_at`.
    pub fn apply_to(&self, ticket: &mut Ticket, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            ticket.title.clone_from(title);
        }
        if let Some(artist) = &self.artist {
            ticket.artist.clone_from(artist);
        }
        if let Some(venue) = &self.venue {
            ticket.venue.clone_from(venue);
        }
        if let Some(seat) = &self.seat {
            ticket.seat = Some(seat.clone());
        }
        if let Some(performed_at) = self.performed_at {
            ticket.performed_at = performed_at;
        }
        if let Some(genre) = &self.genre {
            ticket.genre = Some(genre.clone());
        }
        if let Some(visibility) = self.visibility {
            ticket.visibility = visibility;
        }
        if let Some(images) = &self.images {
            ticket.images.clone_from(images);
        }
        if let Some(text) = &self.review {
            ticket.review = Some(Review {
                text: text.clone(),
                created_at: now,
            });
        }
        ticket.updated_at = now;
    }
}

/// One page of a paginated listing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
#[path = "tests/ticket.rs"]
mod tests;

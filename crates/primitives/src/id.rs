use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix reserved for ids minted locally for speculative entities.
///
/// The backend never issues ids with this prefix, so a pending id can always
/// be told apart from a server-assigned one.
pub const PENDING_ID_PREFIX: &str = "pending-";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Id for the `seq`-th speculative entity of this kind.
            #[must_use]
            pub fn pending(seq: u64) -> Self {
                Self(format!("{PENDING_ID_PREFIX}{seq}"))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_pending(&self) -> bool {
                self.0.starts_with(PENDING_ID_PREFIX)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Backend user id. Friends are addressed by their user id.
    UserId
);
string_id!(
    /// Id of the friendship relation between two users.
    FriendshipId
);
string_id!(
    /// Id of a friend request.
    RequestId
);
string_id!(
    /// Id of a ticket.
    TicketId
);

/// A friend is identified by their user id.
pub type FriendId = UserId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_ids_are_recognised() {
        let id = TicketId::pending(7);
        assert_eq!(id.as_str(), "pending-7");
        assert!(id.is_pending(), "minted id should be pending");
        assert!(
            !TicketId::from("t1").is_pending(),
            "server id must not be pending"
        );
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = UserId::from("u2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u2\"");
        let back: UserId = serde_json::from_str("\"u2\"").unwrap();
        assert_eq!(back, id);
    }
}

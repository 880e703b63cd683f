use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// One hit of a user search.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    /// Public handle shown to other users.
    pub external_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

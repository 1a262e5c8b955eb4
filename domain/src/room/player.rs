use serde::{Deserialize, Serialize};

use crate::{Timestamp, UserId};

/// Membership record, unique per room by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    #[serde(rename = "username")]
    pub display_name: String,
    pub joined_at: Timestamp,
    pub ready: bool,
}

impl Player {
    pub(super) fn new(
        user_id: UserId,
        display_name: String,
    ) -> Self {
        Self {
            user_id,
            display_name,
            joined_at: Timestamp::now(),
            ready: false,
        }
    }
}

//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// Room presence summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPresenceDto {
    pub room_id: String,
    pub online_users: usize,
    pub usernames: Vec<String>,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// Query parameters for the recent messages endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentMessagesQuery {
    pub limit: Option<usize>,
}

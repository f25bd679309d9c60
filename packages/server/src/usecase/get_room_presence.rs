//! UseCase: Room のオンライン状況の取得

use crate::domain::{RoomId, Timestamp, Username};

use super::{SharedRoom, error::GetRoomPresenceError};

/// Room のオンライン状況（読み取り専用のスナップショット）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPresence {
    pub room_id: RoomId,
    pub created_at: Timestamp,
    pub online_users: usize,
    pub usernames: Vec<Username>,
}

pub struct GetRoomPresenceUseCase {
    room: SharedRoom,
}

impl GetRoomPresenceUseCase {
    pub fn new(room: SharedRoom) -> Self {
        Self { room }
    }

    pub async fn execute(&self, room_id: &str) -> Result<RoomPresence, GetRoomPresenceError> {
        let room = self.room.lock().await;
        if room.id.as_str() != room_id {
            return Err(GetRoomPresenceError::RoomNotFound(room_id.to_string()));
        }

        Ok(RoomPresence {
            room_id: room.id.clone(),
            created_at: room.created_at,
            online_users: room.registry.count(),
            usernames: room.registry.usernames(),
        })
    }
}

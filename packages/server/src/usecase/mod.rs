//! UseCase layer (Presence Coordinator).
//!
//! 1 つの操作につき 1 つの UseCase を定義します。
//! 全ての UseCase は同じ `SharedRoom` を共有し、その Mutex を Room ごとの直列化点として使います。
//!
//! ## ロックの規約
//!
//! - Registry の変更・オンライン人数の計算・それに続くブロードキャストは Room のロック内で行う
//! - History Store への追記はロックの外で行い、追記が完了してからブロードキャストする

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ChatEvent, HistoryStore, Room, StorageError};

pub mod check_readiness;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_recent_messages;
pub mod get_room_presence;
pub mod join_room;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use check_readiness::CheckReadinessUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::{DisconnectParticipantUseCase, LeaveOutcome};
pub use error::{GetRecentMessagesError, GetRoomPresenceError, JoinError, SendMessageError};
pub use get_recent_messages::GetRecentMessagesUseCase;
pub use get_room_presence::{GetRoomPresenceUseCase, RoomPresence};
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use send_message::{SendMessageInput, SendMessageUseCase};

/// UseCase 間で共有される Room
pub type SharedRoom = Arc<Mutex<Room>>;

/// join 時に返す履歴の既定の件数
pub const DEFAULT_REPLAY_LIMIT: usize = 50;

/// 直近 `limit` 件の履歴を古い順に読み出す
async fn load_chronological_history(
    history: &dyn HistoryStore,
    limit: usize,
) -> Result<Vec<ChatEvent>, StorageError> {
    let mut events = history.recent(limit).await?;
    events.reverse();
    Ok(events)
}

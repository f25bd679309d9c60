//! UseCase: 直近の履歴の取得
//!
//! join 時のリプレイと同じ上限・同じ順序（古い順）で履歴を返します。

use std::sync::Arc;

use crate::domain::{ChatEvent, HistoryStore};

use super::{SharedRoom, error::GetRecentMessagesError, load_chronological_history};

pub struct GetRecentMessagesUseCase {
    room: SharedRoom,
    history: Arc<dyn HistoryStore>,
    max_limit: usize,
}

impl GetRecentMessagesUseCase {
    pub fn new(room: SharedRoom, history: Arc<dyn HistoryStore>, max_limit: usize) -> Self {
        Self {
            room,
            history,
            max_limit,
        }
    }

    /// 履歴を取得
    ///
    /// `limit` は `max_limit` で頭打ちになります。未指定なら `max_limit` 件。
    pub async fn execute(
        &self,
        room_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatEvent>, GetRecentMessagesError> {
        if self.room.lock().await.id.as_str() != room_id {
            return Err(GetRecentMessagesError::RoomNotFound(room_id.to_string()));
        }

        let limit = limit.map_or(self.max_limit, |limit| limit.min(self.max_limit));
        Ok(load_chronological_history(self.history.as_ref(), limit).await?)
    }
}

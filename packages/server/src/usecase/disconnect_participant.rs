//! UseCase: 参加者切断処理（on_disconnect）
//!
//! 接続ハンドルで Registry から削除し、見つかった場合だけ退出イベントを永続化して通知します。
//! 未参加・削除済みの接続に対しては何も起きません（冪等）。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, HistoryStore, MessagePusher, NewChatEvent, Notice, StorageError, Username,
};

use super::SharedRoom;

/// 切断の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub username: Username,
    /// 削除後のオンライン人数
    pub online_users: usize,
}

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    room: SharedRoom,
    history: Arc<dyn HistoryStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        room: SharedRoom,
        history: Arc<dyn HistoryStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            room,
            history,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(LeaveOutcome))` - 参加者を削除し、退出を通知した
    /// * `Ok(None)` - 登録されていない接続（何もしない）
    /// * `Err(StorageError)` - 参加者は削除したが、退出イベントを永続化できなかった（通知しない）
    pub async fn execute(&self, handle: ConnectionId) -> Result<Option<LeaveOutcome>, StorageError> {
        // 1. Registry から削除
        let removed = self.room.lock().await.registry.unregister_by_handle(&handle);

        // 2. 送信チャンネルは参加状態に関わらず解放する
        self.message_pusher.unregister_connection(&handle).await;

        let Some(username) = removed else {
            tracing::debug!("Connection '{}' closed without a presence entry", handle);
            return Ok(None);
        };

        // 3. 永続化（ロックの外）
        self.history.append(NewChatEvent::left(&username)).await?;

        // 4. 現在の人数で通知
        let room = self.room.lock().await;
        let online_users = room.registry.count();
        let targets = room.registry.handles();
        self.message_pusher
            .broadcast(
                &targets,
                &Notice::UserLeft {
                    username: username.clone(),
                    online_users,
                },
            )
            .await;
        self.message_pusher
            .broadcast(&targets, &Notice::OnlineUsers(online_users))
            .await;

        tracing::info!(
            "'{}' left {}. Online users: {}",
            username,
            room.id,
            online_users
        );

        Ok(Some(LeaveOutcome {
            username,
            online_users,
        }))
    }
}

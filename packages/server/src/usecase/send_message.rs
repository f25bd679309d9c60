//! UseCase: メッセージ送信（on_message）
//!
//! Registry での送信者の確認 → 検証 → History Store への追記（ロックの外）
//! → Room 全体へのブロードキャスト（送信者を含む）。
//! 送信者自身にも同じイベントが届くため、クライアントはそれを配信完了の確認に使えます。

use std::sync::Arc;

use crate::domain::{
    AvatarUrl, ChatEvent, ConnectionId, EventKind, HistoryStore, MessageContent, MessagePusher,
    NewChatEvent, Notice, Username,
};

use super::{SharedRoom, error::SendMessageError};

/// クライアントから届いたメッセージ（未検証）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageInput {
    pub username: Option<String>,
    pub content: Option<String>,
    pub kind: Option<String>,
    pub avatar_url: Option<String>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    room: SharedRoom,
    history: Arc<dyn HistoryStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
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

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `handle` - 送信した接続のハンドル（Registry に登録されていなければ破棄）
    /// * `input` - クライアントが送ったメッセージ。`username` が空ならば登録済みの名前を使う
    ///
    /// # Returns
    ///
    /// * `Ok(ChatEvent)` - 永続化・配信したイベント（サーバー時刻付き）
    /// * `Err(SendMessageError)` - 未参加・検証・永続化の失敗（配信しない）
    pub async fn execute(
        &self,
        handle: ConnectionId,
        input: SendMessageInput,
    ) -> Result<ChatEvent, SendMessageError> {
        // 1. 送信者は Registry に登録されている接続に限る（エコーが必ず本人に届く）
        let sender = self
            .room
            .lock()
            .await
            .registry
            .username_of(&handle)
            .cloned()
            .ok_or(SendMessageError::NotInRoom(handle))?;

        let username = match input.username {
            Some(name) if !name.trim().is_empty() => Username::new(name)?,
            _ => sender,
        };
        let content = MessageContent::new(input.content.unwrap_or_default())?;
        let kind = EventKind::from_client(input.kind.as_deref())?;
        let avatar_url = AvatarUrl::parse_optional(input.avatar_url)?;

        // 2. 永続化（ロックの外）
        let event = self
            .history
            .append(NewChatEvent::message(username, content, kind, avatar_url))
            .await?;

        // 3. 追記が完了したイベントだけを配信
        let room = self.room.lock().await;
        let targets = room.registry.handles();
        let delivered = self
            .message_pusher
            .broadcast(&targets, &Notice::Message(event.clone()))
            .await;

        tracing::info!(
            "Message #{} from '{}' delivered to {}/{} participants",
            event.id.value(),
            event.username,
            delivered,
            targets.len()
        );

        Ok(event)
    }
}

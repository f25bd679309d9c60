//! エンティティ定義

use super::{
    registry::ConnectionRegistry,
    value_object::{AvatarUrl, EventId, EventKind, MessageContent, RoomId, Timestamp, Username},
};

/// system イベントの送信者として使われる固定の表示名
pub const SYSTEM_USERNAME: &str = "System";

/// Room で起きた出来事 1 件（永続化済み）
///
/// History Store が ID とタイムスタンプを付与した後の不変な値です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub username: String,
    pub content: String,
    pub avatar_url: Option<AvatarUrl>,
    pub timestamp: Timestamp,
}

/// History Store に渡す、まだタイムスタンプを持たない ChatEvent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatEvent {
    pub kind: EventKind,
    pub username: String,
    pub content: String,
    pub avatar_url: Option<AvatarUrl>,
}

impl NewChatEvent {
    /// 参加者が送信したメッセージ
    pub fn message(
        username: Username,
        content: MessageContent,
        kind: EventKind,
        avatar_url: Option<AvatarUrl>,
    ) -> Self {
        Self {
            kind,
            username: username.into_string(),
            content: content.into_string(),
            avatar_url,
        }
    }

    /// サーバーが生成する system イベント
    pub fn system(content: String) -> Self {
        Self {
            kind: EventKind::System,
            username: SYSTEM_USERNAME.to_string(),
            content,
            avatar_url: None,
        }
    }

    pub fn joined(username: &Username) -> Self {
        Self::system(format!("{} has joined the chat", username))
    }

    pub fn left(username: &Username) -> Self {
        Self::system(format!("{} has left the chat", username))
    }

    /// ID とタイムスタンプを付与して ChatEvent にする
    pub fn into_event(self, id: EventId, timestamp: Timestamp) -> ChatEvent {
        ChatEvent {
            id,
            kind: self.kind,
            username: self.username,
            content: self.content,
            avatar_url: self.avatar_url,
            timestamp,
        }
    }
}

/// チャットルーム
///
/// 参加者の登録簿（ConnectionRegistry）を所有します。
/// 共有時は `Arc<Mutex<Room>>` として扱い、その Mutex が Room ごとの直列化点になります。
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub registry: ConnectionRegistry,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            registry: ConnectionRegistry::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_and_left_system_events() {
        // テスト項目: join / leave の system イベントが固定の送信者と文面で作られる
        // given (前提条件):
        let alice = Username::new("alice".to_string()).unwrap();

        // when (操作):
        let joined = NewChatEvent::joined(&alice);
        let left = NewChatEvent::left(&alice);

        // then (期待する結果):
        assert_eq!(joined.kind, EventKind::System);
        assert_eq!(joined.username, SYSTEM_USERNAME);
        assert_eq!(joined.content, "alice has joined the chat");
        assert_eq!(left.content, "alice has left the chat");
        assert_eq!(left.avatar_url, None);
    }

    #[test]
    fn test_into_event_keeps_payload() {
        // テスト項目: into_event で ID とタイムスタンプが付与され、本文はそのまま残る
        // given (前提条件):
        let draft = NewChatEvent::message(
            Username::new("bob".to_string()).unwrap(),
            MessageContent::new("hi".to_string()).unwrap(),
            EventKind::Text,
            None,
        );

        // when (操作):
        let event = draft.into_event(EventId::new(7), Timestamp::new(1000));

        // then (期待する結果):
        assert_eq!(event.id, EventId::new(7));
        assert_eq!(event.timestamp, Timestamp::new(1000));
        assert_eq!(event.username, "bob");
        assert_eq!(event.content, "hi");
        assert_eq!(event.kind, EventKind::Text);
    }
}

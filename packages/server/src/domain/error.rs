//! ドメイン層のエラー定義

use thiserror::Error;

use super::value_object::ConnectionId;

/// Value Object の生成エラー（入力のバリデーションエラー）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username is too long ({actual} > {max} characters)")]
    UsernameTooLong { max: usize, actual: usize },

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("avatar url is too long ({actual} > {max} characters)")]
    AvatarUrlTooLong { max: usize, actual: usize },

    #[error("unknown event kind '{0}'")]
    UnknownEventKind(String),

    #[error("event kind 'system' is reserved for the server")]
    ReservedEventKind,

    #[error("room id must not be empty")]
    EmptyRoomId,
}

/// History Store の永続化エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("failed to open history store: {0}")]
    ConnectFailed(String),

    #[error("failed to append chat event: {0}")]
    AppendFailed(String),

    #[error("failed to read chat history: {0}")]
    ReadFailed(String),

    #[error("stored chat event is corrupted: {0}")]
    Corrupted(String),
}

/// MessagePusher の送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(ConnectionId),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode notice: {0}")]
    EncodeFailed(String),
}

/// 接続ごとのセッション状態遷移エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session has not joined the room")]
    NotJoined,

    #[error("session is already disconnected")]
    Disconnected,
}

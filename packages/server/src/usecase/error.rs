//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ConnectionId, StorageError, ValueObjectError};

/// join の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// 入力が不正（イベントは破棄され、状態は変わらない）
    #[error("invalid join: {0}")]
    Validation(#[from] ValueObjectError),

    /// system イベントを永続化できなかった（状態は変わらない）
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// メッセージ送信の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 送信した接続が Registry にいない（未参加・追い出し済み）
    #[error("connection '{0}' is not in the room")]
    NotInRoom(ConnectionId),

    /// 入力が不正（イベントは記録されない）
    #[error("invalid message: {0}")]
    Validation(#[from] ValueObjectError),

    /// 永続化できなかったため配信しない
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomPresenceError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRecentMessagesError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

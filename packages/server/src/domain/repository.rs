//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{ChatEvent, NewChatEvent},
    error::StorageError,
};

/// History Store trait
///
/// Room のイベントを追記専用で保存する外部ストアへのインターフェース。
/// 更新・削除の操作は持ちません。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// イベントを追記し、ID とタイムスタンプを付与した ChatEvent を返す
    ///
    /// タイムスタンプは追記の順に単調非減少でなければなりません。
    async fn append(&self, event: NewChatEvent) -> Result<ChatEvent, StorageError>;

    /// 直近 `limit` 件を新しい順に返す
    async fn recent(&self, limit: usize) -> Result<Vec<ChatEvent>, StorageError>;

    /// ストアが要求を受け付けられる状態か確認する（プロセス内のストアは常に Ok）
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

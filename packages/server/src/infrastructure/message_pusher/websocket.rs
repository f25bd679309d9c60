//! WebSocket を使った MessagePusher 実装（Broadcast Router）
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `Notice` を JSON にエンコードし、1 つの接続（send_direct）または複数の接続（broadcast）へ送る
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信はチャンネルへの enqueue だけで完了するため、遅い接続が他の接続への配信を止めることはありません。
//! 1 つの接続に対する配信順は enqueue の順序と一致します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, Notice, PusherChannel},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_connection(handle, tx).await;
/// pusher.send_direct(&handle, &Notice::OnlineUsers(1)).await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    channels: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの接続数
    pub async fn connection_count(&self) -> usize {
        self.channels.lock().await.len()
    }

    fn encode(notice: &Notice) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(notice))
            .map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, handle: ConnectionId, channel: PusherChannel) {
        let mut channels = self.channels.lock().await;
        channels.insert(handle, channel);
        tracing::debug!("Connection '{}' registered to MessagePusher", handle);
    }

    async fn unregister_connection(&self, handle: &ConnectionId) {
        let mut channels = self.channels.lock().await;
        if channels.remove(handle).is_some() {
            tracing::debug!("Connection '{}' unregistered from MessagePusher", handle);
        }
    }

    async fn send_direct(
        &self,
        handle: &ConnectionId,
        notice: &Notice,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(notice)?;
        let channels = self.channels.lock().await;

        let sender = channels
            .get(handle)
            .ok_or(MessagePushError::ConnectionNotFound(*handle))?;
        sender
            .send(payload)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed {} to connection '{}'", notice.name(), handle);
        Ok(())
    }

    async fn broadcast(&self, targets: &[ConnectionId], notice: &Notice) -> usize {
        let payload = match Self::encode(notice) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Dropping {} broadcast: {}", notice.name(), e);
                return 0;
            }
        };

        let channels = self.channels.lock().await;
        let mut delivered = 0;

        for target in targets {
            match channels.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to push {} to connection '{}': {}",
                            notice.name(),
                            target,
                            e
                        );
                    }
                },
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        tracing::debug!(
            "Broadcasted {} to {}/{} connections",
            notice.name(),
            delivered,
            targets.len()
        );
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - send_direct: 特定の接続への送信
    // - broadcast: 複数接続への送信と部分失敗の扱い
    //
    // 【どのようなシナリオをテストするか】
    // 1. send_direct の成功ケース / 未登録の接続
    // 2. broadcast の成功ケース
    // 3. broadcast の部分失敗ケース（未登録・受信側が閉じた接続）
    // 4. 同じ接続への配信順序
    // ========================================

    #[tokio::test]
    async fn test_send_direct_success() {
        // テスト項目: 特定の接続に JSON エンコードされた通知を送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ConnectionId::generate();
        pusher.register_connection(handle, tx).await;

        // when (操作):
        let result = pusher.send_direct(&handle, &Notice::OnlineUsers(3)).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            rx.recv().await,
            Some(r#"{"event":"online_users","data":3}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_send_direct_connection_not_found() {
        // テスト項目: 未登録の接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let handle = ConnectionId::generate();

        // when (操作):
        let result = pusher.send_direct(&handle, &Notice::OnlineUsers(1)).await;

        // then (期待する結果):
        assert_eq!(result, Err(MessagePushError::ConnectionNotFound(handle)));
    }

    #[tokio::test]
    async fn test_broadcast_success() {
        // テスト項目: 複数の接続にメッセージをブロードキャストできる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        pusher.register_connection(alice, tx1).await;
        pusher.register_connection(bob, tx2).await;

        // when (操作):
        let delivered = pusher
            .broadcast(&[alice, bob], &Notice::OnlineUsers(2))
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 2);
        let expected = Some(r#"{"event":"online_users","data":2}"#.to_string());
        assert_eq!(rx1.recv().await, expected);
        assert_eq!(rx2.recv().await, expected);
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部の宛先が未登録・切断済みでも残りの宛先には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let alive = ConnectionId::generate();
        let closed = ConnectionId::generate();
        let missing = ConnectionId::generate();
        pusher.register_connection(alive, tx1).await;
        pusher.register_connection(closed, tx2).await;
        drop(rx2);

        // when (操作):
        let delivered = pusher
            .broadcast(&[closed, missing, alive], &Notice::OnlineUsers(1))
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert!(rx1.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_preserves_order_per_connection() {
        // テスト項目: 同じ接続には broadcast した順に届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ConnectionId::generate();
        pusher.register_connection(handle, tx).await;

        // when (操作):
        for count in 1..=3 {
            pusher.broadcast(&[handle], &Notice::OnlineUsers(count)).await;
        }

        // then (期待する結果):
        for count in 1..=3 {
            assert_eq!(
                rx.recv().await,
                Some(format!(r#"{{"event":"online_users","data":{}}}"#, count))
            );
        }
    }

    #[tokio::test]
    async fn test_unregister_connection_is_idempotent() {
        // テスト項目: 登録解除は何度呼んでも問題ない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = ConnectionId::generate();
        pusher.register_connection(handle, tx).await;

        // when (操作):
        pusher.unregister_connection(&handle).await;
        pusher.unregister_connection(&handle).await;

        // then (期待する結果):
        assert_eq!(pusher.connection_count().await, 0);
    }
}

//! UseCase: 接続受付（on_connect）
//!
//! 接続を受け付けた時点では Room には参加させず、送信チャンネルの登録だけを行います。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続受付を実行
    ///
    /// # Arguments
    ///
    /// * `handle` - 新しい接続のハンドル
    /// * `channel` - 接続へのメッセージ送信用チャンネル
    pub async fn execute(&self, handle: ConnectionId, channel: PusherChannel) {
        self.message_pusher
            .register_connection(handle, channel)
            .await;
        tracing::info!("Connection '{}' accepted, waiting for join", handle);
    }
}

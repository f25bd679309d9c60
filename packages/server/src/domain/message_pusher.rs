//! MessagePusher trait 定義（Broadcast Router）
//!
//! 接続ごとの送信チャンネルへ通知を届けるためのインターフェース。
//! UseCase 層はこの trait に依存し、WebSocket などの具体的な送信手段には依存しません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, notice::Notice, value_object::ConnectionId};

/// 接続ごとの送信チャンネル
///
/// 受信側は UI 層の writer タスクが持ち、ソケットへ書き出します。
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, handle: ConnectionId, channel: PusherChannel);

    /// 接続の送信チャンネルを登録解除（未登録なら何もしない）
    async fn unregister_connection(&self, handle: &ConnectionId);

    /// 1 つの接続にだけ送る
    async fn send_direct(
        &self,
        handle: &ConnectionId,
        notice: &Notice,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へ送る
    ///
    /// 一部の宛先への送信失敗は記録するだけで、残りの宛先への送信は続けます。
    /// 実際に届けた宛先の数を返します。
    async fn broadcast(&self, targets: &[ConnectionId], notice: &Notice) -> usize;
}

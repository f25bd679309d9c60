//! クライアントへ送る通知の語彙
//!
//! エンコード（JSON 化）は Infrastructure 層の DTO が担当します。

use super::{entity::ChatEvent, value_object::Username};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 現在のオンライン人数
    OnlineUsers(usize),
    /// 参加通知
    UserJoined {
        username: Username,
        online_users: usize,
    },
    /// 退出通知
    UserLeft {
        username: Username,
        online_users: usize,
    },
    /// 参加直後の接続にだけ送る履歴（古い順）
    PreviousMessages(Vec<ChatEvent>),
    /// Room に投稿されたイベント
    Message(ChatEvent),
    /// 操作を行った接続にだけ返すエラー
    Error(String),
}

impl Notice {
    /// ログ出力用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Notice::OnlineUsers(_) => "online_users",
            Notice::UserJoined { .. } => "user_joined",
            Notice::UserLeft { .. } => "user_left",
            Notice::PreviousMessages(_) => "previous_messages",
            Notice::Message(_) => "message",
            Notice::Error(_) => "error",
        }
    }
}

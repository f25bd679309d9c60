//! UseCase: Room への参加（on_join）
//!
//! ## 処理の順序
//!
//! 1. ユーザー名を検証する（不正なら何も変更せずに終了）
//! 2. 「<username> has joined the chat」を History Store に追記する（ロックの外）
//! 3. Room のロック内で:
//!    - Registry に登録する（同じユーザー名は後勝ち）
//!    - 登録後のオンライン人数を計算する
//!    - 直近の履歴を読み出す
//!    - 同じ接続が別名で再 join した場合は古い名前の `user_left` を送る
//!    - `online_users` と `user_joined` を Room 全体にブロードキャストする
//!    - `previous_messages` を新しい接続にだけ送る
//!
//! 履歴の読み出しをロック内で行うため、ロック前にブロードキャストされたメッセージは
//! 必ず履歴に含まれ、ロック後のメッセージはライブで届きます（重複はあり得ても欠落はない）。

use std::sync::Arc;

use crate::domain::{ConnectionId, HistoryStore, MessagePusher, NewChatEvent, Notice, Username};

use super::{SharedRoom, error::JoinError, load_chronological_history};

/// join の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub username: Username,
    /// 登録後のオンライン人数
    pub online_users: usize,
    /// 同じユーザー名で登録されていて、今回上書きされた接続
    pub displaced: Option<ConnectionId>,
    /// 新しい接続に送った履歴の件数
    pub replayed: usize,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    room: SharedRoom,
    history: Arc<dyn HistoryStore>,
    message_pusher: Arc<dyn MessagePusher>,
    replay_limit: usize,
}

impl JoinRoomUseCase {
    pub fn new(
        room: SharedRoom,
        history: Arc<dyn HistoryStore>,
        message_pusher: Arc<dyn MessagePusher>,
        replay_limit: usize,
    ) -> Self {
        Self {
            room,
            history,
            message_pusher,
            replay_limit,
        }
    }

    /// Room 参加を実行
    ///
    /// # Arguments
    ///
    /// * `handle` - 参加する接続のハンドル
    /// * `username` - クライアントが名乗ったユーザー名
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功
    /// * `Err(JoinError)` - 検証または永続化の失敗（Registry は変更されない）
    pub async fn execute(
        &self,
        handle: ConnectionId,
        username: Option<String>,
    ) -> Result<JoinOutcome, JoinError> {
        let username = Username::new(username.unwrap_or_default())?;

        // 1. 永続化（ブロードキャストより先、ロックの外）
        let system_event = self.history.append(NewChatEvent::joined(&username)).await?;

        // 2. Room ごとの直列化点
        let mut room = self.room.lock().await;
        let registration = room.registry.register(username.clone(), handle);
        let online_users = room.registry.count();

        if let Some(displaced) = registration.displaced {
            tracing::warn!(
                "Connection '{}' displaced by '{}' joining as '{}'",
                displaced,
                handle,
                username
            );
        }

        let replay = match load_chronological_history(self.history.as_ref(), self.replay_limit)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Failed to load history for '{}': {}", username, e);
                let notice = Notice::Error("chat history is unavailable".to_string());
                if let Err(e) = self.message_pusher.send_direct(&handle, &notice).await {
                    tracing::warn!("Failed to notify '{}': {}", handle, e);
                }
                Vec::new()
            }
        };
        let replayed = replay.len();

        let targets = room.registry.handles();
        if let Some(previous) = &registration.renamed_from {
            // the old name is gone from the room, so clients must drop it too
            self.message_pusher
                .broadcast(
                    &targets,
                    &Notice::UserLeft {
                        username: previous.clone(),
                        online_users,
                    },
                )
                .await;
            tracing::info!("Connection '{}' renamed '{}' to '{}'", handle, previous, username);
        }
        self.message_pusher
            .broadcast(&targets, &Notice::OnlineUsers(online_users))
            .await;
        self.message_pusher
            .broadcast(
                &targets,
                &Notice::UserJoined {
                    username: username.clone(),
                    online_users,
                },
            )
            .await;
        if let Err(e) = self
            .message_pusher
            .send_direct(&handle, &Notice::PreviousMessages(replay))
            .await
        {
            tracing::warn!("Failed to send previous messages to '{}': {}", handle, e);
        }

        tracing::info!(
            "'{}' joined {} (event #{}). Online users: {}",
            username,
            room.id,
            system_event.id.value(),
            online_users
        );

        Ok(JoinOutcome {
            username,
            online_users,
            displaced: registration.displaced,
            replayed,
        })
    }
}

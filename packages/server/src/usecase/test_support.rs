//! UseCase テスト用の共通ヘルパー

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use hiroba_shared::time::FixedClock;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ChatEvent, ConnectionId, HistoryStore, MessagePushError, MessagePusher, NewChatEvent,
        Notice, PusherChannel, Room, RoomId, StorageError, Timestamp,
    },
    infrastructure::repository::InMemoryHistoryStore,
};

use super::SharedRoom;

pub const TEST_ROOM: &str = "chat_room";
pub const TEST_NOW: i64 = 1_700_000_000_000;

/// 時系列の操作ログ（追記とブロードキャストの順序確認用）
///
/// 追記は `append:<content>`、参加・退出の通知は `push:<name>:<username>`、
/// それ以外の通知は `push:<name>` として記録されます。
pub type OperationLog = Arc<StdMutex<Vec<String>>>;

/// 送信先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Direct(ConnectionId),
    Broadcast(Vec<ConnectionId>),
}

/// 送信内容を記録するテスト用 MessagePusher
#[derive(Default)]
pub struct RecordingPusher {
    registered: StdMutex<Vec<ConnectionId>>,
    sent: StdMutex<Vec<(Delivery, Notice)>>,
    log: Option<OperationLog>,
}

impl RecordingPusher {
    pub fn with_log(log: OperationLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(Delivery, Notice)> {
        self.sent.lock().unwrap().clone()
    }

    /// 指定した接続が受け取った通知（direct + broadcast）
    pub fn received_by(&self, handle: &ConnectionId) -> Vec<Notice> {
        self.sent()
            .into_iter()
            .filter(|(delivery, _)| match delivery {
                Delivery::Direct(target) => target == handle,
                Delivery::Broadcast(targets) => targets.contains(handle),
            })
            .map(|(_, notice)| notice)
            .collect()
    }

    pub fn is_registered(&self, handle: &ConnectionId) -> bool {
        self.registered.lock().unwrap().contains(handle)
    }

    fn record(&self, delivery: Delivery, notice: &Notice) {
        if let Some(log) = &self.log {
            let entry = match notice {
                Notice::UserJoined { username, .. } | Notice::UserLeft { username, .. } => {
                    format!("push:{}:{}", notice.name(), username)
                }
                _ => format!("push:{}", notice.name()),
            };
            log.lock().unwrap().push(entry);
        }
        self.sent.lock().unwrap().push((delivery, notice.clone()));
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_connection(&self, handle: ConnectionId, _channel: PusherChannel) {
        self.registered.lock().unwrap().push(handle);
    }

    async fn unregister_connection(&self, handle: &ConnectionId) {
        self.registered.lock().unwrap().retain(|h| h != handle);
    }

    async fn send_direct(
        &self,
        handle: &ConnectionId,
        notice: &Notice,
    ) -> Result<(), MessagePushError> {
        self.record(Delivery::Direct(*handle), notice);
        Ok(())
    }

    async fn broadcast(&self, targets: &[ConnectionId], notice: &Notice) -> usize {
        self.record(Delivery::Broadcast(targets.to_vec()), notice);
        targets.len()
    }
}

/// 追記を操作ログに残す History Store
pub struct LoggingHistoryStore {
    inner: InMemoryHistoryStore,
    log: OperationLog,
}

impl LoggingHistoryStore {
    pub fn new(log: OperationLog) -> Self {
        Self {
            inner: InMemoryHistoryStore::new(Arc::new(FixedClock::new(TEST_NOW))),
            log,
        }
    }
}

#[async_trait]
impl HistoryStore for LoggingHistoryStore {
    async fn append(&self, event: NewChatEvent) -> Result<ChatEvent, StorageError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("append:{}", event.content));
        self.inner.append(event).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatEvent>, StorageError> {
        self.inner.recent(limit).await
    }
}

pub fn create_test_room() -> SharedRoom {
    Arc::new(Mutex::new(Room::new(
        RoomId::new(TEST_ROOM.to_string()).unwrap(),
        Timestamp::new(TEST_NOW),
    )))
}

pub fn create_test_history() -> Arc<InMemoryHistoryStore> {
    Arc::new(InMemoryHistoryStore::new(Arc::new(FixedClock::new(TEST_NOW))))
}

//! InMemory History Store 実装
//!
//! ドメイン層が定義する HistoryStore trait の具体的な実装。
//! 追記専用の Vec をインメモリ DB として使用します。
//! 削除は行わないため、保持件数はプロセスの寿命とともに増え続けます。

use std::sync::Arc;

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{ChatEvent, EventId, HistoryStore, NewChatEvent, StorageError, Timestamp};

#[derive(Debug, Default)]
struct HistoryLog {
    events: Vec<ChatEvent>,
    last_timestamp: Option<i64>,
}

/// インメモリ History Store 実装
pub struct InMemoryHistoryStore {
    log: Mutex<HistoryLog>,
    clock: Arc<dyn Clock>,
}

impl InMemoryHistoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            log: Mutex::new(HistoryLog::default()),
            clock,
        }
    }

    /// 保存済みのイベント数
    pub async fn len(&self) -> usize {
        self.log.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, event: NewChatEvent) -> Result<ChatEvent, StorageError> {
        let mut log = self.log.lock().await;

        // stamped under the lock: timestamps never go backwards in append order
        let now = self.clock.now_millis();
        let timestamp = log.last_timestamp.map_or(now, |last| now.max(last));
        log.last_timestamp = Some(timestamp);

        let id = EventId::new(log.events.len() as i64 + 1);
        let event = event.into_event(id, Timestamp::new(timestamp));
        log.events.push(event.clone());

        tracing::debug!(
            "Appended {} event #{} from '{}'",
            event.kind.as_str(),
            id.value(),
            event.username
        );
        Ok(event)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatEvent>, StorageError> {
        let log = self.log.lock().await;
        Ok(log.events.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventKind, MessageContent, Username};
    use hiroba_shared::time::FixedClock;
    use std::collections::VecDeque;

    /// 指定した順に時刻を返すテスト用 Clock
    struct ScriptedClock(std::sync::Mutex<VecDeque<i64>>);

    impl ScriptedClock {
        fn new(times: &[i64]) -> Self {
            Self(std::sync::Mutex::new(times.iter().copied().collect()))
        }
    }

    impl Clock for ScriptedClock {
        fn now_millis(&self) -> i64 {
            self.0.lock().unwrap().pop_front().unwrap_or(0)
        }
    }

    fn text_event(username: &str, content: &str) -> NewChatEvent {
        NewChatEvent::message(
            Username::new(username.to_string()).unwrap(),
            MessageContent::new(content.to_string()).unwrap(),
            EventKind::Text,
            None,
        )
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        // テスト項目: 追記すると連番の ID とサーバー時刻が付与される
        // given (前提条件):
        let store = InMemoryHistoryStore::new(Arc::new(FixedClock::new(1000)));

        // when (操作):
        let first = store.append(text_event("alice", "hi")).await.unwrap();
        let second = store.append(text_event("bob", "hello")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, EventId::new(1));
        assert_eq!(second.id, EventId::new(2));
        assert_eq!(first.timestamp, Timestamp::new(1000));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_timestamps_never_decrease() {
        // テスト項目: 時計が巻き戻っても追記順のタイムスタンプは減少しない
        // given (前提条件):
        let clock = ScriptedClock::new(&[2000, 1500, 2500]);
        let store = InMemoryHistoryStore::new(Arc::new(clock));

        // when (操作):
        let a = store.append(text_event("alice", "1")).await.unwrap();
        let b = store.append(text_event("alice", "2")).await.unwrap();
        let c = store.append(text_event("alice", "3")).await.unwrap();

        // then (期待する結果):
        assert_eq!(a.timestamp.value(), 2000);
        assert_eq!(b.timestamp.value(), 2000);
        assert_eq!(c.timestamp.value(), 2500);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first_and_respects_limit() {
        // テスト項目: recent は新しい順に最大 limit 件を返す
        // given (前提条件):
        let store = InMemoryHistoryStore::new(Arc::new(FixedClock::new(1000)));
        for i in 0..60 {
            store
                .append(text_event("alice", &format!("message {}", i)))
                .await
                .unwrap();
        }

        // when (操作):
        let recent = store.recent(50).await.unwrap();

        // then (期待する結果):
        assert_eq!(recent.len(), 50);
        assert_eq!(recent[0].content, "message 59");
        assert_eq!(recent[49].content, "message 10");
    }

    #[tokio::test]
    async fn test_recent_on_empty_store() {
        // テスト項目: 空のストアからは空の履歴が返る
        // given (前提条件):
        let store = InMemoryHistoryStore::new(Arc::new(FixedClock::new(1000)));

        // when (操作):
        let recent = store.recent(50).await.unwrap();

        // then (期待する結果):
        assert!(recent.is_empty());
        assert!(store.is_empty().await);
    }
}

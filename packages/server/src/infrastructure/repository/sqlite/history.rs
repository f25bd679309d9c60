//! SQLite History Store 実装
//!
//! `chat_message` テーブルに追記し、直近の履歴を ID の降順で読み出します。
//! 追記は単一ライターのロックで直列化し、その中でタイムスタンプを付与します。

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::sync::Mutex;

use crate::domain::{
    AvatarUrl, ChatEvent, EventId, EventKind, HistoryStore, NewChatEvent, StorageError, Timestamp,
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS chat_message (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    msg_type TEXT NOT NULL DEFAULT 'text',
    username TEXT NOT NULL,
    content TEXT NOT NULL,
    avatar_url TEXT,
    timestamp INTEGER NOT NULL
)
"#;

type ChatMessageRow = (i64, String, String, String, Option<String>, i64);

pub struct SqliteHistoryStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    /// 最後に払い出したタイムスタンプ（追記の直列化点を兼ねる）
    writer: Mutex<Option<i64>>,
}

impl SqliteHistoryStore {
    /// データベースに接続し、テーブルがなければ作成する
    ///
    /// # Arguments
    ///
    /// * `database_url` - 例: `sqlite://hiroba.db`, `sqlite::memory:`
    /// * `clock` - タイムスタンプの取得元
    pub async fn connect(database_url: &str, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(connect_error)?
            .create_if_missing(true);

        // an in-memory database lives only as long as its single connection
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(connect_error)?;

        Self::from_pool(pool, clock).await
    }

    /// 既存のプールから作成する
    pub async fn from_pool(pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(connect_error)?;

        let (last_timestamp,): (Option<i64>,) =
            sqlx::query_as("SELECT MAX(timestamp) FROM chat_message")
                .fetch_one(&pool)
                .await
                .map_err(connect_error)?;

        tracing::info!("SQLite history store ready");

        Ok(Self {
            pool,
            clock,
            writer: Mutex::new(last_timestamp),
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, event: NewChatEvent) -> Result<ChatEvent, StorageError> {
        let mut last_timestamp = self.writer.lock().await;

        let now = self.clock.now_millis();
        let timestamp = last_timestamp.map_or(now, |last| now.max(last));

        let result = sqlx::query(
            "INSERT INTO chat_message (msg_type, username, content, avatar_url, timestamp) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event.kind.as_str())
        .bind(&event.username)
        .bind(&event.content)
        .bind(event.avatar_url.as_ref().map(AvatarUrl::as_str))
        .bind(timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::AppendFailed(e.to_string()))?;

        // only advance once the row is durable
        *last_timestamp = Some(timestamp);

        let id = EventId::new(result.last_insert_rowid());
        tracing::debug!(
            "Appended {} event #{} from '{}'",
            event.kind.as_str(),
            id.value(),
            event.username
        );
        Ok(event.into_event(id, Timestamp::new(timestamp)))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatEvent>, StorageError> {
        let rows: Vec<ChatMessageRow> = sqlx::query_as(
            "SELECT id, msg_type, username, content, avatar_url, timestamp \
             FROM chat_message ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error)?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(read_error)?;
        Ok(())
    }
}

fn row_to_event(row: ChatMessageRow) -> Result<ChatEvent, StorageError> {
    let (id, msg_type, username, content, avatar_url, timestamp) = row;
    let kind = EventKind::parse(&msg_type).map_err(|e| StorageError::Corrupted(e.to_string()))?;
    let avatar_url =
        AvatarUrl::parse_optional(avatar_url).map_err(|e| StorageError::Corrupted(e.to_string()))?;

    Ok(ChatEvent {
        id: EventId::new(id),
        kind,
        username,
        content,
        avatar_url,
        timestamp: Timestamp::new(timestamp),
    })
}

fn connect_error(e: sqlx::Error) -> StorageError {
    StorageError::ConnectFailed(e.to_string())
}

fn read_error(e: sqlx::Error) -> StorageError {
    StorageError::ReadFailed(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, Username};
    use hiroba_shared::time::FixedClock;

    async fn create_test_store(now: i64) -> SqliteHistoryStore {
        SqliteHistoryStore::connect("sqlite::memory:", Arc::new(FixedClock::new(now)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_and_recent_round_trip_through_table() {
        // テスト項目: 追記したイベントがテーブルから新しい順に読み出せる
        // given (前提条件):
        let store = create_test_store(1000).await;
        let alice = Username::new("alice".to_string()).unwrap();
        store.append(NewChatEvent::joined(&alice)).await.unwrap();

        // when (操作):
        let appended = store
            .append(NewChatEvent::message(
                alice,
                MessageContent::new("hi".to_string()).unwrap(),
                EventKind::Image,
                Some(AvatarUrl::new("/uploads/a.png".to_string()).unwrap()),
            ))
            .await
            .unwrap();
        let recent = store.recent(50).await.unwrap();

        // then (期待する結果):
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0], appended);
        assert_eq!(recent[0].kind, EventKind::Image);
        assert_eq!(
            recent[0].avatar_url.as_ref().map(AvatarUrl::as_str),
            Some("/uploads/a.png")
        );
        assert_eq!(recent[1].kind, EventKind::System);
        assert_eq!(recent[1].content, "alice has joined the chat");
        assert!(recent[0].id > recent[1].id);
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        // テスト項目: recent は limit 件までしか返さない
        // given (前提条件):
        let store = create_test_store(1000).await;
        for i in 0..5 {
            store
                .append(NewChatEvent::system(format!("event {}", i)))
                .await
                .unwrap();
        }

        // when (操作):
        let recent = store.recent(3).await.unwrap();

        // then (期待する結果):
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "event 4");
        assert_eq!(recent[2].content, "event 2");
    }

    #[tokio::test]
    async fn test_timestamp_continues_from_existing_rows() {
        // テスト項目: 既存の行より古い時計でも、新しい行のタイムスタンプは減少しない
        // given (前提条件):
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let first = SqliteHistoryStore::from_pool(pool.clone(), Arc::new(FixedClock::new(5000)))
            .await
            .unwrap();
        first.append(NewChatEvent::system("a".to_string())).await.unwrap();

        // when (操作): 時計が巻き戻った状態で同じテーブルを開き直す
        let reopened = SqliteHistoryStore::from_pool(pool, Arc::new(FixedClock::new(1000)))
            .await
            .unwrap();
        let event = reopened
            .append(NewChatEvent::system("b".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(event.timestamp.value(), 5000);
    }

    #[tokio::test]
    async fn test_unreachable_database_is_a_connect_failure() {
        // テスト項目: 開けないデータベースは読み出しエラーではなく接続エラーとして報告される
        // given (前提条件):
        let url = "sqlite:///hiroba-missing-directory/nested/history.db";

        // when (操作):
        let result = SqliteHistoryStore::connect(url, Arc::new(FixedClock::new(0))).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StorageError::ConnectFailed(_))));
    }

    #[tokio::test]
    async fn test_ping_reports_closed_pool() {
        // テスト項目: ping はプールが使える間は Ok、閉じた後はエラーを返す
        // given (前提条件):
        let store = create_test_store(1000).await;
        let healthy = store.ping().await;

        // when (操作):
        store.pool.close().await;
        let closed = store.ping().await;

        // then (期待する結果):
        assert_eq!(healthy, Ok(()));
        assert!(matches!(closed, Err(StorageError::ReadFailed(_))));
    }
}

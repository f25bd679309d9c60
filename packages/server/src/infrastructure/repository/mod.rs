//! History Store 実装
//!
//! - `inmemory`: プロセス内の Vec を使った実装
//! - `sqlite`: sqlx + SQLite を使った永続化実装

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

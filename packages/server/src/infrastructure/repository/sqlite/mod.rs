pub mod history;

pub use history::SqliteHistoryStore;

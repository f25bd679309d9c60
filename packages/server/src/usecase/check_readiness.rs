//! UseCase: 受け付け可能かの確認（readiness）

use std::sync::Arc;

use crate::domain::{HistoryStore, StorageError};

pub struct CheckReadinessUseCase {
    history: Arc<dyn HistoryStore>,
}

impl CheckReadinessUseCase {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    /// History Store に到達できれば Ok
    pub async fn execute(&self) -> Result<(), StorageError> {
        self.history.ping().await
    }
}

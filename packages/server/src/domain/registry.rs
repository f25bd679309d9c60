//! Connection Registry
//!
//! 「誰がオンラインか」の唯一の情報源です。
//! ユーザー名 → 接続ハンドルの対応と、その逆引きインデックスを保持します。
//!
//! ## 重複ユーザー名
//!
//! 同じユーザー名で 2 本目の接続が join した場合は後勝ち（last-write-wins）です。
//! 先の接続のエントリは上書きされ、`RegisterOutcome::displaced` として返されます。
//! 追い出された接続はそれ以降 fan-out の対象外になり、その接続の切断は no-op になります。

use std::collections::HashMap;

use super::value_object::{ConnectionId, Username};

/// `register` の結果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterOutcome {
    /// 同じユーザー名で登録されていた別の接続（上書きされた）
    pub displaced: Option<ConnectionId>,
    /// 同じ接続が以前に使っていた別のユーザー名（re-join による名前の変更）
    pub renamed_from: Option<Username>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_username: HashMap<Username, ConnectionId>,
    by_handle: HashMap<ConnectionId, Username>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 参加者を登録する（同じユーザー名は上書き）
    pub fn register(&mut self, username: Username, handle: ConnectionId) -> RegisterOutcome {
        let mut outcome = RegisterOutcome::default();

        // the same handle re-joining under another name must not keep its old entry
        if let Some(previous) = self.by_handle.remove(&handle) {
            if previous != username {
                self.by_username.remove(&previous);
                outcome.renamed_from = Some(previous);
            }
        }

        if let Some(old_handle) = self.by_username.insert(username.clone(), handle) {
            if old_handle != handle {
                self.by_handle.remove(&old_handle);
                outcome.displaced = Some(old_handle);
            }
        }
        self.by_handle.insert(handle, username);

        outcome
    }

    /// 接続ハンドルから参加者を削除する
    ///
    /// 一致するエントリがなければ何もせず `None` を返します（切断の重複通知など）。
    pub fn unregister_by_handle(&mut self, handle: &ConnectionId) -> Option<Username> {
        let username = self.by_handle.remove(handle)?;
        self.by_username.remove(&username);
        Some(username)
    }

    pub fn count(&self) -> usize {
        self.by_username.len()
    }

    pub fn contains_handle(&self, handle: &ConnectionId) -> bool {
        self.by_handle.contains_key(handle)
    }

    /// 接続が現在登録されているユーザー名（追い出された接続は `None`）
    pub fn username_of(&self, handle: &ConnectionId) -> Option<&Username> {
        self.by_handle.get(handle)
    }

    /// fan-out 用のスナップショット（ユーザー名順）
    pub fn snapshot(&self) -> Vec<(Username, ConnectionId)> {
        let mut entries: Vec<(Username, ConnectionId)> = self
            .by_username
            .iter()
            .map(|(username, handle)| (username.clone(), *handle))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// fan-out 対象の接続ハンドル一覧
    pub fn handles(&self) -> Vec<ConnectionId> {
        self.snapshot().into_iter().map(|(_, handle)| handle).collect()
    }

    /// オンラインのユーザー名一覧（ソート済み）
    pub fn usernames(&self) -> Vec<Username> {
        self.snapshot()
            .into_iter()
            .map(|(username, _)| username)
            .collect()
    }
}

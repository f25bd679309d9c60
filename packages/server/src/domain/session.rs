//! Session Lifecycle
//!
//! 1 本の接続が辿る状態遷移です。
//!
//! ```text
//! Connected --join--> Joined --close--> Disconnected
//!                      |  ^
//!                      +--+ (re-join)
//! ```

use super::{
    error::SessionError,
    value_object::{ConnectionId, Username},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 接続済み・未参加
    Connected,
    /// Room に参加済み
    Joined { username: Username },
    /// 終端状態
    Disconnected,
}

#[derive(Debug)]
pub struct Session {
    handle: ConnectionId,
    state: SessionState,
}

impl Session {
    pub fn new(handle: ConnectionId) -> Self {
        Self {
            handle,
            state: SessionState::Connected,
        }
    }

    pub fn handle(&self) -> ConnectionId {
        self.handle
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// join が受理されたことを記録する（re-join は上書き）
    pub fn join(&mut self, username: Username) -> Result<(), SessionError> {
        if self.state == SessionState::Disconnected {
            return Err(SessionError::Disconnected);
        }
        self.state = SessionState::Joined { username };
        Ok(())
    }

    /// 参加済みのユーザー名
    pub fn username(&self) -> Result<&Username, SessionError> {
        match &self.state {
            SessionState::Joined { username } => Ok(username),
            SessionState::Connected => Err(SessionError::NotJoined),
            SessionState::Disconnected => Err(SessionError::Disconnected),
        }
    }

    /// 切断を記録する
    ///
    /// 最初の 1 回だけ `true` を返します。呼び出し側はこれを見て on_disconnect を 1 度だけ実行します。
    pub fn disconnect(&mut self) -> bool {
        if self.state == SessionState::Disconnected {
            return false;
        }
        self.state = SessionState::Disconnected;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    #[test]
    fn test_new_session_is_connected_but_not_joined() {
        // テスト項目: 新しいセッションは Connected 状態で、ユーザー名を持たない
        // given (前提条件):
        let session = Session::new(ConnectionId::generate());

        // when (操作):
        let result = session.username();

        // then (期待する結果):
        assert_eq!(session.state(), &SessionState::Connected);
        assert_eq!(result, Err(SessionError::NotJoined));
    }

    #[test]
    fn test_join_and_rejoin() {
        // テスト項目: join で Joined になり、re-join ではユーザー名が上書きされる
        // given (前提条件):
        let mut session = Session::new(ConnectionId::generate());

        // when (操作):
        session.join(username("alice")).unwrap();
        session.join(username("alicia")).unwrap();

        // then (期待する結果):
        assert_eq!(session.username(), Ok(&username("alicia")));
    }

    #[test]
    fn test_disconnect_is_reported_once() {
        // テスト項目: disconnect は最初の 1 回だけ true を返し、その後の join は拒否される
        // given (前提条件):
        let mut session = Session::new(ConnectionId::generate());
        session.join(username("alice")).unwrap();

        // when (操作):
        let first = session.disconnect();
        let second = session.disconnect();

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(session.join(username("alice")), Err(SessionError::Disconnected));
        assert_eq!(session.username(), Err(SessionError::Disconnected));
    }
}

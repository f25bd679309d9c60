//! Value Object 定義
//!
//! 生成時にバリデーションを行い、不正な値を持つインスタンスが存在しないことを保証します。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// ユーザー名の最大文字数（履歴テーブルのカラム幅に合わせる）
pub const USERNAME_MAX_LEN: usize = 80;

/// アバター URL の最大文字数
pub const AVATAR_URL_MAX_LEN: usize = 255;

/// 表示名（Presence Entry のキー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// 新しい Username を作成
    ///
    /// 前後の空白は取り除かれます。空文字列や上限を超える長さはエラーになります。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyUsername);
        }
        let len = trimmed.chars().count();
        if len > USERNAME_MAX_LEN {
            return Err(ValueObjectError::UsernameTooLong {
                max: USERNAME_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// 新しい MessageContent を作成
    ///
    /// 空白のみの本文はエラーになります。本文そのものは加工しません。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyContent);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// 表示用画像への参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrl(String);

impl AvatarUrl {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let len = value.chars().count();
        if len > AVATAR_URL_MAX_LEN {
            return Err(ValueObjectError::AvatarUrlTooLong {
                max: AVATAR_URL_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(value))
    }

    /// クライアントから届いた任意項目を変換する
    ///
    /// `None` と空文字列はどちらも「未指定」として扱います。
    pub fn parse_optional(value: Option<String>) -> Result<Option<Self>, ValueObjectError> {
        match value {
            Some(value) if !value.trim().is_empty() => Self::new(value).map(Some),
            _ => Ok(None),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ChatEvent の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventKind {
    #[default]
    Text,
    Image,
    System,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Text => "text",
            EventKind::Image => "image",
            EventKind::System => "system",
        }
    }

    /// 保存済みの値から復元する（`system` を含む）
    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        match value {
            "text" => Ok(EventKind::Text),
            "image" => Ok(EventKind::Image),
            "system" => Ok(EventKind::System),
            other => Err(ValueObjectError::UnknownEventKind(other.to_string())),
        }
    }

    /// クライアントが指定した種類を変換する
    ///
    /// 未指定なら `text`。`system` はサーバーだけが生成できるため拒否します。
    pub fn from_client(value: Option<&str>) -> Result<Self, ValueObjectError> {
        match value {
            None => Ok(EventKind::Text),
            Some(value) => match Self::parse(value)? {
                EventKind::System => Err(ValueObjectError::ReservedEventKind),
                kind => Ok(kind),
            },
        }
    }
}

/// Room の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続ハンドル（WebSocket 接続ごとに払い出される）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// ランダムな ConnectionId を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// History Store が払い出すイベント ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(i64);

impl EventId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

//! Domain layer for the chat presence and broadcast core.
//!
//! Business rules and the interfaces the outer layers implement.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod notice;
pub mod registry;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{ChatEvent, NewChatEvent, Room, SYSTEM_USERNAME};
pub use error::{MessagePushError, SessionError, StorageError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notice::Notice;
pub use registry::{ConnectionRegistry, RegisterOutcome};
pub use repository::HistoryStore;
pub use session::{Session, SessionState};
pub use value_object::{
    AvatarUrl, ConnectionId, EventId, EventKind, MessageContent, RoomId, Timestamp, Username,
};

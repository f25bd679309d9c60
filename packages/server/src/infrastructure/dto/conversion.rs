//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatEvent, Notice};
use crate::infrastructure::dto::websocket as dto;
use crate::usecase::SendMessageInput;

// ========================================
// Domain → DTO
// ========================================

impl From<&ChatEvent> for dto::ChatEventDto {
    fn from(event: &ChatEvent) -> Self {
        Self {
            kind: event.kind.as_str().to_string(),
            username: event.username.clone(),
            content: event.content.clone(),
            timestamp: timestamp_to_rfc3339(event.timestamp.value()),
            avatar_url: event.avatar_url.as_ref().map(|url| url.as_str().to_string()),
        }
    }
}

impl From<&Notice> for dto::ServerEvent {
    fn from(notice: &Notice) -> Self {
        match notice {
            Notice::OnlineUsers(count) => Self::OnlineUsers(*count),
            Notice::UserJoined {
                username,
                online_users,
            } => Self::UserJoined(dto::PresenceChangeDto {
                username: username.as_str().to_string(),
                online_users: *online_users,
            }),
            Notice::UserLeft {
                username,
                online_users,
            } => Self::UserLeft(dto::PresenceChangeDto {
                username: username.as_str().to_string(),
                online_users: *online_users,
            }),
            Notice::PreviousMessages(events) => {
                Self::PreviousMessages(events.iter().map(dto::ChatEventDto::from).collect())
            }
            Notice::Message(event) => Self::Message(event.into()),
            Notice::Error(message) => Self::Error(dto::ErrorDto {
                message: message.clone(),
            }),
        }
    }
}

// ========================================
// DTO → UseCase input
// ========================================

impl From<dto::MessagePayload> for SendMessageInput {
    fn from(payload: dto::MessagePayload) -> Self {
        Self {
            username: payload.username,
            content: payload.content,
            kind: payload.kind,
            avatar_url: payload.avatar_url,
        }
    }
}

//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::{
        http::{RecentMessagesQuery, RoomPresenceDto},
        websocket::ChatEventDto,
    },
    ui::state::AppState,
    usecase::{GetRecentMessagesError, GetRoomPresenceError},
};
use hiroba_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness check endpoint: 503 while the history store is unreachable
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.check_readiness_usecase.execute().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))),
        Err(e) => {
            tracing::warn!("History store is not ready: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "not_ready"})),
            )
        }
    }
}

/// Get the online users of a room
pub async fn get_room_presence(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomPresenceDto>, StatusCode> {
    match state.get_room_presence_usecase.execute(&room_id).await {
        Ok(presence) => {
            // Domain Model から DTO への変換
            Ok(Json(RoomPresenceDto {
                room_id: presence.room_id.as_str().to_string(),
                online_users: presence.online_users,
                usernames: presence
                    .usernames
                    .into_iter()
                    .map(|username| username.into_string())
                    .collect(),
                created_at: timestamp_to_rfc3339(presence.created_at.value()),
            }))
        }
        Err(GetRoomPresenceError::RoomNotFound(_)) => Err(StatusCode::NOT_FOUND),
    }
}

/// Get the most recent chat events of a room, oldest first
pub async fn get_recent_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<RecentMessagesQuery>,
) -> Result<Json<Vec<ChatEventDto>>, StatusCode> {
    match state
        .get_recent_messages_usecase
        .execute(&room_id, query.limit)
        .await
    {
        Ok(events) => Ok(Json(events.iter().map(ChatEventDto::from).collect())),
        Err(GetRecentMessagesError::RoomNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(GetRecentMessagesError::Storage(e)) => {
            tracing::error!("Failed to read history for '{}': {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

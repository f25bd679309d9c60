//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    domain::{HistoryStore, MessagePusher},
    usecase::{
        CheckReadinessUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetRecentMessagesUseCase, GetRoomPresenceUseCase, JoinRoomUseCase, SendMessageUseCase,
        SharedRoom,
    },
};

/// Shared application state
pub struct AppState {
    /// MessagePusher（接続したクライアントへの直接通知に使用）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub get_room_presence_usecase: Arc<GetRoomPresenceUseCase>,
    pub get_recent_messages_usecase: Arc<GetRecentMessagesUseCase>,
    pub check_readiness_usecase: Arc<CheckReadinessUseCase>,
}

impl AppState {
    /// Wire every use case against one room, one history store and one pusher
    ///
    /// # Arguments
    ///
    /// * `room` - The room shared by all use cases (its mutex serializes presence changes)
    /// * `history` - Durable chat history
    /// * `message_pusher` - Outbound delivery to connections
    /// * `replay_limit` - Number of events replayed to a newly joined connection
    pub fn new(
        room: SharedRoom,
        history: Arc<dyn HistoryStore>,
        message_pusher: Arc<dyn MessagePusher>,
        replay_limit: usize,
    ) -> Self {
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                message_pusher.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                room.clone(),
                history.clone(),
                message_pusher.clone(),
                replay_limit,
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                room.clone(),
                history.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                room.clone(),
                history.clone(),
                message_pusher.clone(),
            )),
            get_room_presence_usecase: Arc::new(GetRoomPresenceUseCase::new(room.clone())),
            get_recent_messages_usecase: Arc::new(GetRecentMessagesUseCase::new(
                room,
                history.clone(),
                replay_limit,
            )),
            check_readiness_usecase: Arc::new(CheckReadinessUseCase::new(history)),
            message_pusher,
        }
    }
}

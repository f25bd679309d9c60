mod http;
mod websocket;

pub use http::{get_recent_messages, get_room_presence, health_check, readiness_check};
pub use websocket::websocket_handler;

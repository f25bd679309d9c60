//! Server configuration.

/// The single shared room every connection joins
pub const DEFAULT_ROOM_ID: &str = "chat_room";

/// Allowed origins for cross-origin HTTP requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse `*` or a comma-separated list of origins.
    pub fn parse(value: &str) -> Self {
        if value.trim() == "*" {
            return Self::Any;
        }

        Self::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite URL; in-memory history when absent
    pub database_url: Option<String>,
    /// Replay depth on join, also the cap for the history endpoint
    pub history_limit: usize,
    pub cors_origins: CorsOrigins,
    pub log_level: String,
}

//! Hiroba chat server.
//!
//! Accepts WebSocket connections on `/ws`, admits them into the shared chat
//! room on `join` and fans out messages and presence changes.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --database-url sqlite://hiroba.db
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;

use hiroba_server::{
    config::{CorsOrigins, DEFAULT_ROOM_ID, ServerConfig},
    domain::{HistoryStore, Room, RoomId, StorageError, Timestamp},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryHistoryStore, SqliteHistoryStore},
    },
    ui::{AppState, Server},
    usecase::DEFAULT_REPLAY_LIMIT,
};
use hiroba_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time chat presence and broadcast server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// SQLite database URL for chat history (in-memory history if omitted)
    #[arg(long, env = "HIROBA_DATABASE_URL")]
    database_url: Option<String>,

    /// Number of recent events replayed to a client when it joins
    #[arg(long, env = "HIROBA_HISTORY_LIMIT", default_value_t = DEFAULT_REPLAY_LIMIT)]
    history_limit: usize,

    /// Allowed CORS origins: "*" or a comma-separated list
    #[arg(long, env = "HIROBA_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            database_url: args.database_url,
            history_limit: args.history_limit,
            cors_origins: CorsOrigins::parse(&args.cors_origins),
            log_level: args.log_level,
        }
    }
}

async fn create_history_store(
    database_url: Option<&str>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn HistoryStore>, StorageError> {
    match database_url {
        Some(url) => {
            let store = SqliteHistoryStore::connect(url, clock).await?;
            tracing::info!("Chat history stored in {}", url);
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Chat history kept in memory");
            Ok(Arc::new(InMemoryHistoryStore::new(clock)))
        }
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from(Args::parse());

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Room
    // 2. History Store
    // 3. MessagePusher
    // 4. UseCases (AppState)
    // 5. Server

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Create the shared room
    let room_id = match RoomId::new(DEFAULT_ROOM_ID.to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Invalid room id: {}", e);
            std::process::exit(1);
        }
    };
    let room = Arc::new(Mutex::new(Room::new(
        room_id,
        Timestamp::new(clock.now_millis()),
    )));
    tracing::info!("Room {} created!", DEFAULT_ROOM_ID);

    // 2. Create History Store
    let history = match create_history_store(config.database_url.as_deref(), clock.clone()).await
    {
        Ok(history) => history,
        Err(e) => {
            tracing::error!("Failed to open history store: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 4. Create UseCases
    let app_state = AppState::new(room, history, message_pusher, config.history_limit);

    // 5. Create and run the server
    let server = Server::new(app_state, config.cors_origins);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

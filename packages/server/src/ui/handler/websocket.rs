//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitStream, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, Notice, Session, SessionState},
    infrastructure::dto::websocket::{ClientEvent, JoinPayload, MessagePayload},
    ui::state::AppState,
    usecase::{JoinError, JoinOutcome, SendMessageError},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: notices addressed to this connection
/// (via rx channel) are written to its WebSocket.
///
/// # Arguments
///
/// * `rx` - Channel receiver for encoded notices
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// A join still running in its own task (kept so teardown can wait for it)
type PendingJoin = Option<JoinHandle<Result<JoinOutcome, JoinError>>>;

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let handle = ConnectionId::generate();

    // Create a channel for this connection to receive notices
    let (tx, rx) = mpsc::unbounded_channel();
    state.connect_participant_usecase.execute(handle, tx).await;

    let (sender, mut receiver) = socket.split();
    let mut session = Session::new(handle);
    let mut pending_join: PendingJoin = None;

    let mut send_task = pusher_loop(rx, sender);

    // If either side finishes, the connection is over
    tokio::select! {
        _ = receive_loop(&state, &mut session, &mut receiver, &mut pending_join) => {},
        _ = &mut send_task => {},
    };
    send_task.abort();

    finish_connection(&state, &mut session, pending_join).await;
}

/// Run on_disconnect once, after any interrupted join has completed
async fn finish_connection(state: &AppState, session: &mut Session, pending_join: PendingJoin) {
    if let Some(task) = pending_join {
        // an interrupted join finishes registering before the entry is removed
        if let Err(e) = task.await {
            tracing::warn!("Join task for '{}' did not finish: {}", session.handle(), e);
        }
    }

    if !session.disconnect() {
        return;
    }

    match state
        .disconnect_participant_usecase
        .execute(session.handle())
        .await
    {
        Ok(Some(outcome)) => {
            tracing::info!(
                "'{}' left ({} online)",
                outcome.username,
                outcome.online_users
            );
        }
        Ok(None) => {
            tracing::info!(
                "Connection '{}' closed without an active join",
                session.handle()
            );
        }
        Err(e) => {
            tracing::error!("Failed to record leave for '{}': {}", session.handle(), e);
        }
    }
}

async fn receive_loop(
    state: &AppState,
    session: &mut Session,
    receiver: &mut SplitStream<WebSocket>,
    pending_join: &mut PendingJoin,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on '{}': {}", session.handle(), e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::Join(payload)) => {
                    handle_join(state, session, payload, pending_join).await
                }
                Ok(ClientEvent::Message(payload)) => {
                    handle_message(state, session, payload).await
                }
                Err(e) => {
                    tracing::warn!(
                        "Dropping malformed event from '{}': {}",
                        session.handle(),
                        e
                    );
                }
            },
            Message::Ping(_) => {
                tracing::debug!("Received ping");
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", session.handle());
                break;
            }
            _ => {}
        }
    }
}

async fn handle_join(
    state: &AppState,
    session: &mut Session,
    payload: JoinPayload,
    pending_join: &mut PendingJoin,
) {
    if matches!(session.state(), SessionState::Disconnected) {
        return;
    }

    let usecase = state.join_room_usecase.clone();
    let handle = session.handle();
    let task = pending_join.insert(tokio::spawn(async move {
        usecase.execute(handle, payload.username).await
    }));
    let result = task.await;
    *pending_join = None;

    match result {
        Ok(Ok(outcome)) => {
            if let Err(e) = session.join(outcome.username) {
                tracing::warn!("Session '{}' could not join: {}", handle, e);
            }
        }
        Ok(Err(JoinError::Validation(e))) => {
            tracing::warn!("Dropping join from '{}': {}", handle, e);
        }
        Ok(Err(JoinError::Storage(e))) => {
            tracing::error!("Join from '{}' failed: {}", handle, e);
            notify_error(state, handle, "failed to join the chat").await;
        }
        Err(e) => {
            tracing::error!("Join task for '{}' failed: {}", handle, e);
        }
    }
}

async fn handle_message(state: &AppState, session: &Session, payload: MessagePayload) {
    if let Err(e) = session.username() {
        tracing::warn!("Dropping message from '{}': {}", session.handle(), e);
        return;
    }

    match state
        .send_message_usecase
        .execute(session.handle(), payload.into())
        .await
    {
        Ok(_) => {}
        Err(SendMessageError::NotInRoom(handle)) => {
            tracing::warn!(
                "Dropping message from '{}': connection was displaced from the room",
                handle
            );
        }
        Err(SendMessageError::Validation(e)) => {
            tracing::warn!("Dropping message from '{}': {}", session.handle(), e);
        }
        Err(SendMessageError::Storage(e)) => {
            tracing::error!(
                "Message from '{}' was not recorded: {}",
                session.handle(),
                e
            );
            notify_error(state, session.handle(), "message could not be delivered").await;
        }
    }
}

async fn notify_error(state: &AppState, handle: ConnectionId, message: &str) {
    let notice = Notice::Error(message.to_string());
    if let Err(e) = state.message_pusher.send_direct(&handle, &notice).await {
        tracing::warn!("Failed to notify '{}': {}", handle, e);
    }
}

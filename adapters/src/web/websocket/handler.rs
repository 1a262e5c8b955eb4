use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use application::ports::out_::Credentials;
use domain::{ClientCommand, CoordinationError, ServerEvent, Session};

use crate::web::state::AppState;

/// Query string of the upgrade request, as set by the site's login layer.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

impl From<ConnectParams> for Credentials {
    fn from(params: ConnectParams) -> Self {
        Self {
            user_id: params.user_id,
            username: params.username,
        }
    }
}

pub async fn handle_connection(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let credentials = Credentials::from(params);
    ws.on_upgrade(move |socket| serve_socket(socket, credentials, state))
}

async fn serve_socket(
    socket: WebSocket,
    credentials: Credentials,
    state: Arc<AppState>,
) {
    let (sender, receiver) = socket.split();
    let (outbox, inbox) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(sender, inbox));

    let identity = state.authenticator.authenticate(&credentials);
    let session = match state.dispatcher.connect(identity, outbox).await {
        Ok(session) => session,
        Err(err) => {
            // The outbox is gone, so the writer flushes the error and closes.
            debug!(error = %err, "Closing refused connection");
            let _ = writer.await;
            return;
        }
    };

    read_commands(&session, receiver, &state).await;

    info!(user_id = %session.user_id, "Socket closed");
    state.dispatcher.disconnect(&session).await;
    let _ = writer.await;
}

/// Handles one inbound frame at a time, so a user's commands are applied in
/// the order they were sent.
async fn read_commands(
    session: &Session,
    mut receiver: SplitStream<WebSocket>,
    state: &AppState,
) {
    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => {
                debug!(user_id = %session.user_id, message = %text, "<- Received");
                match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(command) => state.dispatcher.handle(session, command).await,
                    Err(e) => {
                        warn!(user_id = %session.user_id, error = %e, "Failed to parse message");
                        state
                            .dispatcher
                            .reject(session, CoordinationError::InvalidMessage(e.to_string()))
                            .await;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

async fn write_events(
    mut sender: SplitSink<WebSocket, Message>,
    mut inbox: UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = inbox.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                warn!(event = event.name(), error = %e, "Failed to encode event");
                continue;
            }
        };
        if sender.send(Message::Text(text.into())).await.is_err() {
            return;
        }
    }
    let _ = sender.send(Message::Close(None)).await;
}

pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::{SplitSink, StreamExt}};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::Identity;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
    pub room: String,
}

/// WebSocket upgrade handler. Session is checked by `auth::require_session`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(viewer) = state.identity_for_token(&params.token).await else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    tracing::info!(
        "WebSocket connection request: viewer={}, room={}",
        viewer.username,
        params.room
    );

    ws.on_upgrade(move |socket| handle_socket(socket, viewer, params.room, state))
}

async fn send_json(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, viewer: Identity, room_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let snapshot = match state.join_room(&room_id, &viewer.username).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("Viewer {} could not join {}: {}", viewer.username, room_id, e);
            let error = ServerMessage::Error {
                code: "ROOM_NOT_FOUND".to_string(),
                msg: e.to_string(),
            };
            let _ = send_json(&mut sender, &error).await;
            return;
        }
    };

    // Subscribe before the welcome so no phase change slips between them
    let Some(mut room_rx) = state.subscribe(&room_id).await else {
        return;
    };

    let welcome = ServerMessage::Welcome {
        viewer: viewer.username.clone(),
        is_host: state.is_host(&room_id, &viewer.username).await,
        room: snapshot,
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if !send_json(&mut sender, &welcome).await {
        tracing::error!("Failed to send welcome message");
        let _ = state.exit_room(&room_id, &viewer.username).await;
        return;
    }

    let mut exited = false;
    loop {
        tokio::select! {
            room_msg = room_rx.recv() => {
                match room_msg {
                    Ok(msg) => {
                        if !send_json(&mut sender, &msg).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Viewer {} lagged, skipped {} messages", viewer.username, skipped);
                    }
                    // Room closed
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &viewer, &room_id, &state).await
                                {
                                    let leaving = matches!(response, ServerMessage::RoomExited { .. });
                                    if !send_json(&mut sender, &response).await {
                                        tracing::error!("Failed to send response");
                                        break;
                                    }
                                    if leaving {
                                        exited = true;
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                let _ = send_json(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if !exited {
        if let Err(e) = state.exit_room(&room_id, &viewer.username).await {
            tracing::debug!("Disconnect cleanup for {}: {}", viewer.username, e);
        }
    }
    let _ = sender.close().await;

    tracing::info!("WebSocket connection closed for viewer: {}", viewer.username);
}

//! WebSocket message dispatch
//!
//! Game actions that the room turns down are dropped on the floor: the
//! reason is logged, the client hears nothing back.

use crate::auth::Identity;
use crate::error::RoomError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Log a rejected action and produce no reply
fn rejected(viewer: &Identity, action: &str, err: RoomError) -> Option<ServerMessage> {
    tracing::debug!(viewer = %viewer.username, action, reason = %err, "Action rejected");
    None
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    viewer: &Identity,
    room_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let name = viewer.username.as_str();

    match msg {
        ClientMessage::StartRound => match state.start_round(room_id, name).await {
            // Phase change reaches everyone, this viewer included, via broadcast
            Ok(_) => None,
            Err(e) => rejected(viewer, "start_round", e),
        },

        ClientMessage::ConcludeRound => match state.conclude_round(room_id, name).await {
            Ok(()) => None,
            Err(e) => rejected(viewer, "conclude_round", e),
        },

        ClientMessage::SubmitPhrase { text } => {
            match state.submit_phrase(room_id, name, &text).await {
                Ok(phrase_id) => Some(ServerMessage::PhraseAccepted { phrase_id }),
                Err(e) => rejected(viewer, "submit_phrase", e),
            }
        }

        ClientMessage::CastVote { phrase_id } => {
            match state.cast_vote(room_id, name, &phrase_id).await {
                Ok(()) => Some(ServerMessage::VoteAccepted { phrase_id }),
                Err(e) => rejected(viewer, "cast_vote", e),
            }
        }

        ClientMessage::ExitRoom => {
            if let Err(e) = state.exit_room(room_id, name).await {
                tracing::debug!(viewer = %name, reason = %e, "Exit without presence");
            }
            Some(ServerMessage::RoomExited {
                redirect: "/".to_string(),
            })
        }
    }
}

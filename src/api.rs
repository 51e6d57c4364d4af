//! HTTP API endpoints: sign-in, lobby listing and room snapshots.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::{ApiError, RoomError};
use crate::room::RoomSnapshot;
use crate::state::AppState;
use crate::types::RoomSummary;

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub username: String,
}

/// Sign in with just a username.
///
/// POST /api/signin
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Identity>, ApiError> {
    state
        .sign_in(&req.username)
        .await
        .map(Json)
        .ok_or(ApiError::Unauthorized)
}

/// List lobby rooms.
///
/// GET /api/rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    Json(state.list_rooms().await)
}

/// Snapshot of an open room.
///
/// GET /api/rooms/{room_id}
pub async fn room_snapshot(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    let snapshot = state
        .room_snapshot(&room_id)
        .await
        .ok_or(RoomError::RoomNotFound)?;
    Ok(Json(snapshot))
}

use crate::types::Phase;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Reasons a room operation was turned down.
///
/// None of these reach players as error messages; the WebSocket layer logs
/// them and leaves the room untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomError {
    #[error("Invalid phase. Expected: {expected}, Actual: {actual}")]
    InvalidPhaseTransition { expected: Phase, actual: Phase },

    #[error("Only the host can do that")]
    NotHost,

    #[error("Phrase does not match the acronym")]
    InvalidPhraseFormat,

    #[error("Already done this round")]
    DuplicateAction,

    #[error("Time is up")]
    TimeExpired,

    #[error("Phrase not on the ballot")]
    UnknownPhrase,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Viewer is not in this room")]
    NotInRoom,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sign-in refused")]
    Unauthorized,

    #[error(transparent)]
    Room(#[from] RoomError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Room(RoomError::RoomNotFound) => StatusCode::NOT_FOUND,
            ApiError::Room(_) => StatusCode::CONFLICT,
        };

        (status, self.to_string()).into_response()
    }
}

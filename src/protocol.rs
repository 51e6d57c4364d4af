use crate::room::{PhraseInfo, RoomSnapshot};
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    // Host-only; silently ignored for everyone else
    StartRound,
    ConcludeRound,

    SubmitPhrase { text: String },
    CastVote { phrase_id: PhraseId },
    ExitRoom,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        viewer: String,
        is_host: bool,
        room: RoomSnapshot,
        server_now: String,
    },
    Phase {
        phase: Phase,
        round_no: u32,
        acronym: Acronym,
        remaining: u32,
        server_now: String,
    },
    Timer {
        remaining: u32,
    },
    /// Phrases up for vote, sent when voting opens
    Ballot {
        list: Vec<PhraseInfo>,
    },
    PhraseAccepted {
        phrase_id: PhraseId,
    },
    VoteAccepted {
        phrase_id: PhraseId,
    },
    RoomExited {
        redirect: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn phase_of(room: &Room, remaining: u32) -> Self {
        ServerMessage::Phase {
            phase: room.phase,
            round_no: room.round_no,
            acronym: room.acronym.clone(),
            remaining,
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }
}

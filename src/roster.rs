//! Room and player roster source
//!
//! The room controller only reads from the roster; scores and the host flag
//! are owned by whoever implements `RosterProvider`.

use crate::types::{Player, RoomId, RoomSummary};
use async_trait::async_trait;

#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Rooms available in the lobby
    async fn list_rooms(&self) -> Vec<RoomSummary>;

    /// Players of a room, highest score first. `None` if the room is unknown.
    async fn room_players(&self, room_id: &str) -> Option<Vec<Player>>;
}

/// In-memory roster with a fixed set of rooms that all share the same players
#[derive(Debug, Clone)]
pub struct MockRoster {
    rooms: Vec<RoomSummary>,
    players: Vec<Player>,
}

impl Default for MockRoster {
    fn default() -> Self {
        Self::new(mock_rooms(), mock_players())
    }
}

impl MockRoster {
    pub fn new(rooms: Vec<RoomSummary>, mut players: Vec<Player>) -> Self {
        players.sort_by(|a, b| b.score.cmp(&a.score));
        Self { rooms, players }
    }
}

#[async_trait]
impl RosterProvider for MockRoster {
    async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms.clone()
    }

    async fn room_players(&self, room_id: &str) -> Option<Vec<Player>> {
        self.rooms
            .iter()
            .any(|r| r.id == room_id)
            .then(|| self.players.clone())
    }
}

fn player(id: &str, name: &str, score: i64, is_oldest: bool) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        score,
        is_oldest,
    }
}

/// Alice is the designated host
pub fn mock_players() -> Vec<Player> {
    let mut players = vec![
        player("user1", "Alice", 120, true),
        player("user2", "Bob", 150, false),
        player("user3", "Charlie", 90, false),
    ];
    players.sort_by(|a, b| b.score.cmp(&a.score));
    players
}

pub fn mock_rooms() -> Vec<RoomSummary> {
    let room = |id: &str, name: &str, rounds: u32, players: u32, max_players: u32| RoomSummary {
        id: RoomId::from(id),
        name: name.to_string(),
        rounds,
        players,
        max_players,
    };
    vec![
        room("AB7DEZ", "Beginner Fun", 3, 2, 5),
        room("CXY89K", "Quick Match", 0, 1, 4),
        room("LMNPQR", "Pros Only", 10, 4, 5),
        room("STVW12", "Casual Hangout", 1, 3, 6),
    ]
}

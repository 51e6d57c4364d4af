mod rooms;
mod session;

pub use rooms::RoomSlot;
pub use session::SessionStore;

use crate::auth::{CredentialCheck, PermissiveCredentials};
use crate::roster::{MockRoster, RosterProvider};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub const DEFAULT_SESSION_LIMIT: usize = 10_000;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomId, RoomSlot>>>,
    /// Identity token -> signed-in viewer
    pub sessions: Arc<RwLock<SessionStore>>,
    /// Most sessions kept at once; the oldest goes first
    pub session_limit: usize,
    pub roster: Arc<dyn RosterProvider>,
    pub credentials: Arc<dyn CredentialCheck>,
    pub room_config: RoomConfig,
    /// Wall-clock length of one countdown second
    pub tick_interval: Duration,
}

impl AppState {
    pub fn new(
        roster: Arc<dyn RosterProvider>,
        credentials: Arc<dyn CredentialCheck>,
        room_config: RoomConfig,
        tick_interval: Duration,
    ) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(SessionStore::default())),
            session_limit: DEFAULT_SESSION_LIMIT,
            roster,
            credentials,
            room_config,
            tick_interval,
        }
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.roster.list_rooms().await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Arc::new(MockRoster::default()),
            Arc::new(PermissiveCredentials),
            RoomConfig::default(),
            Duration::from_secs(1),
        )
    }
}

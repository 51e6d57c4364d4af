use super::AppState;
use crate::error::RoomError;
use crate::protocol::ServerMessage;
use crate::room::{RoomPhaseController, RoomSnapshot, Tick};
use crate::timer::PhaseTimer;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::broadcast;

const ROOM_CHANNEL_CAPACITY: usize = 64;

/// Everything the server keeps for one open room
#[derive(Debug)]
pub struct RoomSlot {
    pub controller: RoomPhaseController,
    /// At most one live ticker; replaced whenever a countdown starts
    pub timer: Option<PhaseTimer>,
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl RoomSlot {
    fn new(controller: RoomPhaseController) -> Self {
        let (tx, _rx) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            controller,
            timer: None,
            broadcast: tx,
        }
    }

    fn send(&self, msg: ServerMessage) {
        // No subscribers is fine
        let _ = self.broadcast.send(msg);
    }

    fn send_phase(&self) {
        self.send(ServerMessage::phase_of(
            self.controller.room(),
            self.controller.remaining(),
        ));
        if self.controller.phase() == Phase::Voting {
            self.send(ServerMessage::Ballot {
                list: self.controller.ballot(),
            });
        }
    }

    /// Release the previous ticker and acquire one for the running countdown.
    ///
    /// The outgoing ticker may be the task calling this; nothing may await
    /// after it returns.
    fn rearm_timer(&mut self, state: &Arc<AppState>) {
        self.timer = self.controller.timer_epoch().map(|epoch| {
            PhaseTimer::spawn(
                state.clone(),
                self.controller.room().id.clone(),
                epoch,
                state.tick_interval,
            )
        });
    }
}

impl AppState {
    /// Enter a room, opening it from the roster on first use
    pub async fn join_room(
        &self,
        room_id: &str,
        viewer: &str,
    ) -> Result<RoomSnapshot, RoomError> {
        if let Some(slot) = self.rooms.write().await.get_mut(room_id) {
            slot.controller.enter_room(viewer);
            return Ok(slot.controller.snapshot());
        }

        let players = self
            .roster
            .room_players(room_id)
            .await
            .ok_or(RoomError::RoomNotFound)?;

        let mut rooms = self.rooms.write().await;
        // Someone else may have opened it while the roster was queried
        let slot = rooms.entry(room_id.to_string()).or_insert_with(|| {
            tracing::info!(room = room_id, players = players.len(), "Opening room");
            let room = Room::new(room_id.to_string(), players);
            RoomSlot::new(RoomPhaseController::new(room, self.room_config.clone()))
        });
        slot.controller.enter_room(viewer);
        Ok(slot.controller.snapshot())
    }

    pub async fn subscribe(&self, room_id: &str) -> Option<broadcast::Receiver<ServerMessage>> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|slot| slot.broadcast.subscribe())
    }

    pub async fn room_snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|slot| slot.controller.snapshot())
    }

    pub async fn is_host(&self, room_id: &str, viewer: &str) -> bool {
        self.rooms
            .read()
            .await
            .get(room_id)
            .is_some_and(|slot| slot.controller.room().is_host(viewer))
    }

    pub async fn start_round(
        self: &Arc<Self>,
        room_id: &str,
        viewer: &str,
    ) -> Result<Acronym, RoomError> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        let acronym = {
            let mut rng = rand::rng();
            slot.controller.start_round(viewer, &mut rng)?.clone()
        };
        slot.rearm_timer(self);
        slot.send_phase();
        Ok(acronym)
    }

    pub async fn submit_phrase(
        &self,
        room_id: &str,
        viewer: &str,
        text: &str,
    ) -> Result<PhraseId, RoomError> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        let phrase = slot.controller.submit_phrase(viewer, text)?;
        Ok(phrase.id.clone())
    }

    pub async fn cast_vote(
        &self,
        room_id: &str,
        viewer: &str,
        phrase_id: &str,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        slot.controller.cast_vote(viewer, phrase_id)
    }

    pub async fn conclude_round(&self, room_id: &str, viewer: &str) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        slot.controller.conclude_round(viewer)?;
        slot.send_phase();
        Ok(())
    }

    /// Leave a room. The last viewer out closes it, which also stops its timer.
    pub async fn exit_room(&self, room_id: &str, viewer: &str) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        let remaining = slot.controller.exit_room(viewer)?;
        tracing::info!(room = room_id, viewer, remaining, "Viewer left room");
        if remaining == 0 {
            rooms.remove(room_id);
            tracing::info!(room = room_id, "Room closed");
        }
        Ok(())
    }

    /// Advance the room's countdown by one second.
    ///
    /// Returns whether the ticker holding `epoch` should keep going.
    pub async fn tick_room(self: &Arc<Self>, room_id: &str, epoch: u64) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(slot) = rooms.get_mut(room_id) else {
            return false;
        };
        if slot.controller.timer_epoch() != Some(epoch) {
            return false;
        }

        match slot.controller.tick() {
            Tick::Idle => false,
            Tick::Counting { remaining } => {
                slot.send(ServerMessage::Timer { remaining });
                true
            }
            Tick::Transitioned { to } => {
                tracing::debug!(room = room_id, phase = %to, "Timer moved room");
                slot.send_phase();
                slot.rearm_timer(self);
                false
            }
        }
    }
}

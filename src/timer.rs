use crate::state::AppState;
use crate::types::RoomId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Ticker task driving one countdown of one room.
///
/// Owned by the room slot; dropping it aborts the task, so a room never has
/// two countdowns running.
#[derive(Debug)]
pub struct PhaseTimer {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl PhaseTimer {
    pub fn spawn(state: Arc<AppState>, room_id: RoomId, epoch: u64, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if !state.tick_room(&room_id, epoch).await {
                    break;
                }
            }

            tracing::debug!(room = %room_id, epoch, "Phase timer finished");
        });

        Self { epoch, handle }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

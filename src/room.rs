//! Round lifecycle for a single room
//!
//! `RoomPhaseController` is a synchronous state machine: the server layer
//! feeds it viewer actions and one `tick` per second, and it decides when
//! phases change. It never sleeps or spawns anything itself.

use crate::acronym::{generate_acronym, letters_for_round, validate_phrase, wrap_round};
use crate::error::RoomError;
use crate::types::*;
use rand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Active countdown for the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub remaining: u32,
    /// Bumped every time a countdown starts, so stale tickers can tell
    pub epoch: u64,
}

/// Result of a single `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No countdown running
    Idle,
    Counting { remaining: u32 },
    /// Countdown hit zero and the room moved on
    Transitioned { to: Phase },
}

/// Ballot entry as shown to voters (no author)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhraseInfo {
    pub id: PhraseId,
    pub text: String,
}

impl From<&SubmittedPhrase> for PhraseInfo {
    fn from(p: &SubmittedPhrase) -> Self {
        Self {
            id: p.id.clone(),
            text: p.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub phase: Phase,
    pub round_no: u32,
    pub acronym: Acronym,
    pub remaining: u32,
    pub players: Vec<Player>,
    pub host: Option<String>,
    pub ballot: Vec<PhraseInfo>,
}

#[derive(Debug)]
pub struct RoomPhaseController {
    room: Room,
    config: RoomConfig,
    countdown: Option<Countdown>,
    next_epoch: u64,
    /// Everything submitted during the current PhraseEntry, in order
    phrases: Vec<SubmittedPhrase>,
    ballot: Vec<SubmittedPhrase>,
    submitted: HashSet<PlayerId>,
    votes: HashMap<PlayerId, PhraseId>,
    /// Open connections per viewer
    present: HashMap<PlayerId, usize>,
}

impl RoomPhaseController {
    pub fn new(room: Room, config: RoomConfig) -> Self {
        Self {
            room,
            config,
            countdown: None,
            next_epoch: 0,
            phrases: Vec::new(),
            ballot: Vec::new(),
            submitted: HashSet::new(),
            votes: HashMap::new(),
            present: HashMap::new(),
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn phase(&self) -> Phase {
        self.room.phase
    }

    pub fn remaining(&self) -> u32 {
        self.countdown.map(|c| c.remaining).unwrap_or(0)
    }

    /// Epoch of the running countdown, if any
    pub fn timer_epoch(&self) -> Option<u64> {
        self.countdown.map(|c| c.epoch)
    }

    pub fn ballot(&self) -> Vec<PhraseInfo> {
        self.ballot.iter().map(PhraseInfo::from).collect()
    }

    pub fn vote_of(&self, viewer: &str) -> Option<&PhraseId> {
        self.votes.get(viewer)
    }

    pub fn has_submitted(&self, viewer: &str) -> bool {
        self.submitted.contains(viewer)
    }

    pub fn present_count(&self) -> usize {
        self.present.len()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.room.id.clone(),
            phase: self.room.phase,
            round_no: self.room.round_no,
            acronym: self.room.acronym.clone(),
            remaining: self.remaining(),
            players: self.room.players.clone(),
            host: self.room.host().map(|p| p.name.clone()),
            ballot: self.ballot(),
        }
    }

    pub fn enter_room(&mut self, viewer: &str) {
        *self.present.entry(viewer.to_string()).or_insert(0) += 1;
    }

    /// Drop one of the viewer's connections; returns how many viewers remain.
    ///
    /// A viewer only leaves once their last connection is gone.
    pub fn exit_room(&mut self, viewer: &str) -> Result<usize, RoomError> {
        let connections = self.present.get_mut(viewer).ok_or(RoomError::NotInRoom)?;
        *connections -= 1;
        if *connections == 0 {
            self.present.remove(viewer);
        }
        Ok(self.present.len())
    }

    /// Host kicks off the next round: new acronym, fresh bookkeeping,
    /// phrase countdown running.
    pub fn start_round<R: Rng>(
        &mut self,
        viewer: &str,
        rng: &mut R,
    ) -> Result<&Acronym, RoomError> {
        self.expect_phase(Phase::NotStarted)?;
        if !self.room.is_host(viewer) {
            return Err(RoomError::NotHost);
        }

        let round = wrap_round(self.room.round_no + 1, self.config.max_letters);
        self.room.round_no = round;
        self.room.acronym = generate_acronym(letters_for_round(round), rng);
        self.phrases.clear();
        self.ballot.clear();
        self.submitted.clear();
        self.votes.clear();

        let seconds = self.config.phrase_seconds(self.room.acronym.len());
        self.room.phase = Phase::PhraseEntry;
        self.start_countdown(seconds);

        tracing::info!(
            room = %self.room.id,
            round,
            acronym = %self.room.acronym,
            seconds,
            "Round started"
        );
        Ok(&self.room.acronym)
    }

    pub fn submit_phrase(
        &mut self,
        viewer: &str,
        text: &str,
    ) -> Result<&SubmittedPhrase, RoomError> {
        self.expect_phase(Phase::PhraseEntry)?;
        if self.remaining() == 0 {
            return Err(RoomError::TimeExpired);
        }
        if self.submitted.contains(viewer) {
            return Err(RoomError::DuplicateAction);
        }
        if !validate_phrase(text, &self.room.acronym) {
            return Err(RoomError::InvalidPhraseFormat);
        }

        self.submitted.insert(viewer.to_string());
        self.phrases.push(SubmittedPhrase {
            id: ulid::Ulid::new().to_string(),
            text: text.trim().to_string(),
            acronym: self.room.acronym.to_string(),
            author: viewer.to_string(),
            submitted_at: chrono::Utc::now().to_rfc3339(),
        });

        let phrase = &self.phrases[self.phrases.len() - 1];
        tracing::info!(room = %self.room.id, viewer, phrase = %phrase.text, "Phrase submitted");
        Ok(phrase)
    }

    pub fn cast_vote(&mut self, viewer: &str, phrase_id: &str) -> Result<(), RoomError> {
        self.expect_phase(Phase::Voting)?;
        if self.remaining() == 0 {
            return Err(RoomError::TimeExpired);
        }
        if self.votes.contains_key(viewer) {
            return Err(RoomError::DuplicateAction);
        }
        if !self.ballot.iter().any(|p| p.id == phrase_id) {
            return Err(RoomError::UnknownPhrase);
        }

        self.votes.insert(viewer.to_string(), phrase_id.to_string());
        tracing::info!(room = %self.room.id, viewer, phrase_id, "Vote cast");
        Ok(())
    }

    /// Host closes the results so another round can start
    pub fn conclude_round(&mut self, viewer: &str) -> Result<(), RoomError> {
        self.expect_phase(Phase::Results)?;
        if !self.room.is_host(viewer) {
            return Err(RoomError::NotHost);
        }
        self.room.phase = Phase::NotStarted;
        Ok(())
    }

    /// One second passes. This is the only place time moves phases.
    pub fn tick(&mut self) -> Tick {
        let Some(countdown) = self.countdown.as_mut() else {
            return Tick::Idle;
        };

        countdown.remaining = countdown.remaining.saturating_sub(1);
        if countdown.remaining > 0 {
            return Tick::Counting {
                remaining: countdown.remaining,
            };
        }

        self.countdown = None;
        match self.room.phase.after_timeout() {
            Some(Phase::Voting) => self.enter_voting(),
            Some(Phase::Results) => self.enter_results(),
            // Countdowns only run in PhraseEntry and Voting
            _ => return Tick::Idle,
        }
        Tick::Transitioned {
            to: self.room.phase,
        }
    }

    fn enter_voting(&mut self) {
        let acronym = self.room.acronym.to_string();
        self.ballot = self
            .phrases
            .iter()
            .filter(|p| p.acronym == acronym)
            .cloned()
            .collect();
        self.votes.clear();

        let seconds = self.config.voting_seconds(self.room.acronym.len());
        self.room.phase = Phase::Voting;
        self.start_countdown(seconds);
        tracing::info!(
            room = %self.room.id,
            ballot = self.ballot.len(),
            seconds,
            "Phrase entry time up, voting open"
        );
    }

    fn enter_results(&mut self) {
        self.room.phase = Phase::Results;
        tracing::info!(room = %self.room.id, votes = self.votes.len(), "Voting time up");
    }

    fn start_countdown(&mut self, seconds: u32) {
        self.next_epoch += 1;
        self.countdown = Some(Countdown {
            remaining: seconds,
            epoch: self.next_epoch,
        });
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), RoomError> {
        if self.room.phase != expected {
            return Err(RoomError::InvalidPhaseTransition {
                expected,
                actual: self.room.phase,
            });
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type PhraseId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    PhraseEntry,
    Voting,
    Results,
}

impl Phase {
    /// Phase the countdown hands over to when it runs out.
    /// `None` for phases that never run a countdown.
    pub fn after_timeout(self) -> Option<Phase> {
        match self {
            Phase::PhraseEntry => Some(Phase::Voting),
            Phase::Voting => Some(Phase::Results),
            Phase::NotStarted | Phase::Results => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "NotStarted",
            Phase::PhraseEntry => "PhraseEntry",
            Phase::Voting => "Voting",
            Phase::Results => "Results",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub phrase_seconds_per_letter: u32,
    pub voting_seconds_per_letter: u32,
    /// Letter count used for the voting timer when the acronym is empty
    pub voting_fallback_letters: u32,
    pub max_letters: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            phrase_seconds_per_letter: 8,
            voting_seconds_per_letter: 10,
            voting_fallback_letters: 3,
            max_letters: 9,
        }
    }
}

impl RoomConfig {
    pub fn phrase_seconds(&self, letters: usize) -> u32 {
        (letters as u32).saturating_mul(self.phrase_seconds_per_letter)
    }

    pub fn voting_seconds(&self, letters: usize) -> u32 {
        let letters = if letters > 0 {
            letters as u32
        } else {
            self.voting_fallback_letters
        };
        letters.saturating_mul(self.voting_seconds_per_letter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: i64,
    /// Host designation as supplied by the roster source
    pub is_oldest: bool,
}

/// Ordered letters a phrase has to match word for word.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Acronym(Vec<char>);

impl Acronym {
    pub fn new(letters: Vec<char>) -> Self {
        Self(letters)
    }

    pub fn letters(&self) -> &[char] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Acronym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in &self.0 {
            write!(f, "{}", letter)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub players: Vec<Player>,
    pub phase: Phase,
    pub round_no: u32,
    pub acronym: Acronym,
}

impl Room {
    pub fn new(id: RoomId, players: Vec<Player>) -> Self {
        Self {
            id,
            players,
            phase: Phase::NotStarted,
            round_no: 0,
            acronym: Acronym::default(),
        }
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_oldest)
    }

    /// Host check is a plain name comparison against the flagged player
    pub fn is_host(&self, viewer: &str) -> bool {
        self.host().is_some_and(|p| p.name == viewer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedPhrase {
    pub id: PhraseId,
    pub text: String,
    /// Acronym letters joined, e.g. "ABC"
    pub acronym: String,
    pub author: PlayerId,
    pub submitted_at: String,
}

/// Lobby listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub rounds: u32,
    pub players: u32,
    pub max_players: u32,
}

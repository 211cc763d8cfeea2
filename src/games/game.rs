//! Per-game record and lifecycle
//!
//! `Joining -> AwaitingStart -> InProgress -> Finished`. The first two phases
//! are purely a function of the clock; `started` and `finished` only ever go
//! from false to true.

use crate::common::types::{Address, GameId, Timestamp, TokenAmount};
use crate::games::board::{Board, MAX_NUMBER};
use crate::games::params::GlobalConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Before the join deadline, not started
    Joining,
    /// Join window elapsed, waiting for the owner to start
    AwaitingStart,
    /// Started, numbers being drawn
    InProgress,
    /// Every number has been drawn
    Finished,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Joining => write!(f, "joining"),
            GamePhase::AwaitingStart => write!(f, "awaiting_start"),
            GamePhase::InProgress => write!(f, "in_progress"),
            GamePhase::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub created_at: Timestamp,
    pub started: bool,
    pub finished: bool,
    pub join_deadline: Timestamp,
    /// Zero until the game starts
    pub turn_deadline: Timestamp,
    /// Fee snapshot taken at creation
    pub fee: TokenAmount,
    /// Turn duration snapshot taken at creation
    pub turn_duration: u64,
    /// Join order
    pub players: Vec<Address>,
    pub boards: BTreeMap<Address, Board>,
    /// Append-only draw history
    pub drawn_numbers: Vec<u8>,
    pub current_random: u64,
    pub pot: TokenAmount,
}

impl Game {
    pub fn new(id: GameId, config: &GlobalConfig, created_at: Timestamp, join_deadline: Timestamp) -> Self {
        Self {
            id,
            created_at,
            started: false,
            finished: false,
            join_deadline,
            turn_deadline: 0,
            fee: config.fee,
            turn_duration: config.turn_duration,
            players: Vec::new(),
            boards: BTreeMap::new(),
            drawn_numbers: Vec::new(),
            current_random: 0,
            pot: 0,
        }
    }

    pub fn phase(&self, now: Timestamp) -> GamePhase {
        if self.finished {
            GamePhase::Finished
        } else if self.started {
            GamePhase::InProgress
        } else if now < self.join_deadline {
            GamePhase::Joining
        } else {
            GamePhase::AwaitingStart
        }
    }

    pub fn is_join_open(&self, now: Timestamp) -> bool {
        self.phase(now) == GamePhase::Joining
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn has_player(&self, player: &Address) -> bool {
        self.boards.contains_key(player)
    }

    pub fn board_of(&self, player: &Address) -> Option<&Board> {
        self.boards.get(player)
    }

    pub fn is_drawn(&self, number: u8) -> bool {
        self.drawn_numbers.contains(&number)
    }

    pub fn remaining_numbers(&self) -> usize {
        MAX_NUMBER as usize - self.drawn_numbers.len()
    }

    /// Players whose board completes a line, in join order
    pub fn winners(&self) -> Vec<Address> {
        self.players
            .iter()
            .filter(|player| {
                self.boards
                    .get(*player)
                    .is_some_and(|board| board.has_bingo(&self.drawn_numbers))
            })
            .copied()
            .collect()
    }
}

//! Contract event log
//!
//! One event per committed state change, in commit order.

use crate::common::types::{Address, GameId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BingoEvent {
    GameCreated {
        game_id: GameId,
        join_deadline: Timestamp,
        fee: TokenAmount,
    },
    PlayerJoined {
        game_id: GameId,
        player: Address,
        sequence: u64,
        fee: TokenAmount,
    },
    GameStarted {
        game_id: GameId,
        turn_deadline: Timestamp,
        players: u64,
    },
    RandomGenerated {
        game_id: GameId,
        random: u64,
    },
    NumberDrawn {
        game_id: GameId,
        number: u8,
        turn_deadline: Timestamp,
    },
    GameFinished {
        game_id: GameId,
    },
    FeeUpdated {
        previous: TokenAmount,
        current: TokenAmount,
    },
    JoinDurationUpdated {
        previous: u64,
        current: u64,
    },
    TurnDurationUpdated {
        previous: u64,
        current: u64,
    },
    OwnershipTransferred {
        previous: Address,
        current: Address,
    },
}

impl BingoEvent {
    /// Game the event belongs to, if any
    pub fn game_id(&self) -> Option<GameId> {
        match self {
            BingoEvent::GameCreated { game_id, .. }
            | BingoEvent::PlayerJoined { game_id, .. }
            | BingoEvent::GameStarted { game_id, .. }
            | BingoEvent::RandomGenerated { game_id, .. }
            | BingoEvent::NumberDrawn { game_id, .. }
            | BingoEvent::GameFinished { game_id } => Some(*game_id),
            BingoEvent::FeeUpdated { .. }
            | BingoEvent::JoinDurationUpdated { .. }
            | BingoEvent::TurnDurationUpdated { .. }
            | BingoEvent::OwnershipTransferred { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = BingoEvent::NumberDrawn {
            game_id: 3,
            number: 42,
            turn_deadline: 120,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "number_drawn");
        assert_eq!(json["number"], 42);
    }

    #[test]
    fn test_game_id_of_admin_events_is_none() {
        let event = BingoEvent::FeeUpdated {
            previous: 100,
            current: 110,
        };
        assert_eq!(event.game_id(), None);
        assert_eq!(BingoEvent::GameFinished { game_id: 2 }.game_id(), Some(2));
    }
}

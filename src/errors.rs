//! Error types for the Bingo contract
//!
//! Every operation either commits its whole state transition or returns one
//! of these errors with the contract left exactly as it was.

use crate::common::types::{Address, GameId, Timestamp, TokenAmount};
use thiserror::Error;

/// Root error type for all Bingo operations
#[derive(Debug, Error)]
pub enum BingoError {
    /// Game lifecycle and authorization errors
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Errors surfaced unchanged from the token ledger
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// State persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Game registry, lifecycle and draw errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Invalid game id {0}: game ids start at 1")]
    InvalidGameId(GameId),

    #[error("Game {0} already exists")]
    GameAlreadyExists(GameId),

    #[error("Join window for game {game_id} closed at {deadline}")]
    JoinWindowClosed { game_id: GameId, deadline: Timestamp },

    #[error("Join window for game {game_id} is open until {deadline}")]
    JoinWindowStillOpen { game_id: GameId, deadline: Timestamp },

    #[error("{player} already holds a board in game {game_id}")]
    AlreadyJoined { game_id: GameId, player: Address },

    #[error("Game {0} already started")]
    AlreadyStarted(GameId),

    #[error("Game {0} is finished")]
    GameFinished(GameId),

    #[error("Game {game_id} is full ({max_players} players)")]
    GameFull { game_id: GameId, max_players: usize },

    #[error("Number {number} was already drawn in game {game_id}")]
    DuplicateDraw { game_id: GameId, number: u8 },

    #[error("No undrawn number found for game {game_id} after {attempts} attempts")]
    DrawSpaceExhausted { game_id: GameId, attempts: u32 },

    #[error("No unique board found for game {game_id} after {attempts} attempts")]
    BoardSpaceExhausted { game_id: GameId, attempts: u32 },
}

/// Token ledger errors, propagated without retry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance: {account} holds {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: TokenAmount,
        required: TokenAmount,
    },

    #[error("Insufficient allowance: {spender} may spend {available} of {owner}, needs {required}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        available: TokenAmount,
        required: TokenAmount,
    },

    #[error("Balance overflow for {0}")]
    Overflow(Address),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Snapshot persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

/// Board layouts rejected by `Board::from_rows`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Centre cell must be the free space, found {0}")]
    FreeCellOccupied(u8),

    #[error("{number} at row {row} is outside column {column} range {low}..={high}")]
    OutOfColumnRange {
        number: u8,
        row: usize,
        column: char,
        low: u8,
        high: u8,
    },

    #[error("{0} appears twice")]
    DuplicateNumber(u8),
}

/// Account address parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid address hex: '{0}'")]
    InvalidHex(String),

    #[error("Address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

// Convenience type alias for Results
pub type BingoResult<T> = Result<T, BingoError>;

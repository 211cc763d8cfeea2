//! 75-ball bingo boards
//!
//! A board is a 5x5 grid. Column `c` holds five distinct numbers from
//! `15c+1 ..= 15c+15` and the centre cell is a free space.

use crate::common::types::{Address, GameId, Timestamp};
use crate::errors::{BoardError, GameError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub const BOARD_SIZE: usize = 5;
/// Highest number on a board and in the draw
pub const MAX_NUMBER: u8 = 75;
/// Numbers available to each column
pub const COLUMN_SPAN: u8 = 15;
/// Marker stored in the free centre cell
pub const FREE_CELL: u8 = 0;
/// Regeneration attempts before a board collision is treated as fatal
pub const MAX_BOARD_ATTEMPTS: u32 = 16;

const CENTRE: usize = BOARD_SIZE / 2;
const COLUMN_LETTERS: [char; BOARD_SIZE] = ['B', 'I', 'N', 'G', 'O'];

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// `cells[row][column]`
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Build a board from a 32-byte seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let mut rng = StdRng::from_seed(seed);
        let mut cells = [[FREE_CELL; BOARD_SIZE]; BOARD_SIZE];

        for column in 0..BOARD_SIZE {
            let low = column as u8 * COLUMN_SPAN + 1;
            let pool: Vec<u8> = (low..low + COLUMN_SPAN).collect();
            for (row, number) in pool.choose_multiple(&mut rng, BOARD_SIZE).enumerate() {
                cells[row][column] = *number;
            }
        }
        cells[CENTRE][CENTRE] = FREE_CELL;

        Self { cells }
    }

    /// Build a board from explicit rows, checking column ranges and uniqueness
    pub fn from_rows(cells: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self, BoardError> {
        let mut seen = [false; MAX_NUMBER as usize + 1];

        for (row, values) in cells.iter().enumerate() {
            for (column, &number) in values.iter().enumerate() {
                if row == CENTRE && column == CENTRE {
                    if number != FREE_CELL {
                        return Err(BoardError::FreeCellOccupied(number));
                    }
                    continue;
                }

                let low = column as u8 * COLUMN_SPAN + 1;
                if number < low || number >= low + COLUMN_SPAN {
                    return Err(BoardError::OutOfColumnRange {
                        number,
                        row,
                        column: COLUMN_LETTERS[column],
                        low,
                        high: low + COLUMN_SPAN - 1,
                    });
                }
                if std::mem::replace(&mut seen[number as usize], true) {
                    return Err(BoardError::DuplicateNumber(number));
                }
            }
        }

        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[[u8; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// The 24 numbers on the board (free space excluded)
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells
            .iter()
            .flatten()
            .copied()
            .filter(|&n| n != FREE_CELL)
    }

    pub fn contains(&self, number: u8) -> bool {
        number != FREE_CELL && self.numbers().any(|n| n == number)
    }

    /// Number of complete rows, columns and diagonals given the draw history
    pub fn completed_lines(&self, drawn: &[u8]) -> usize {
        let mut marked_numbers = [false; MAX_NUMBER as usize + 1];
        for &number in drawn {
            if let Some(slot) = marked_numbers.get_mut(number as usize) {
                *slot = true;
            }
        }
        let marked = |row: usize, column: usize| {
            let number = self.cells[row][column];
            number == FREE_CELL || marked_numbers[number as usize]
        };

        let rows = (0..BOARD_SIZE)
            .filter(|&r| (0..BOARD_SIZE).all(|c| marked(r, c)))
            .count();
        let columns = (0..BOARD_SIZE)
            .filter(|&c| (0..BOARD_SIZE).all(|r| marked(r, c)))
            .count();
        let diagonal = (0..BOARD_SIZE).all(|i| marked(i, i)) as usize;
        let anti_diagonal = (0..BOARD_SIZE).all(|i| marked(i, BOARD_SIZE - 1 - i)) as usize;

        rows + columns + diagonal + anti_diagonal
    }

    pub fn has_bingo(&self, drawn: &[u8]) -> bool {
        self.completed_lines(drawn) > 0
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in COLUMN_LETTERS {
            write!(f, "{:>4}", letter)?;
        }
        writeln!(f)?;
        for row in &self.cells {
            for &number in row {
                if number == FREE_CELL {
                    write!(f, "{:>4}", "*")?;
                } else {
                    write!(f, "{:>4}", number)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Seed for the `attempt`-th board candidate of a player's join
pub fn board_seed(
    entropy: &[u8; 32],
    game_id: GameId,
    now: Timestamp,
    player: &Address,
    sequence: u64,
    attempt: u32,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(entropy);
    hasher.update(game_id.to_be_bytes());
    hasher.update(now.to_be_bytes());
    hasher.update(player.as_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(attempt.to_be_bytes());
    hasher.finalize().into()
}

/// Generate a board that `is_taken` rejects for no one else in the game.
///
/// Candidates are regenerated with the next attempt index; running out of
/// attempts means the board space is undersized and is not recoverable.
pub fn generate_unique<F>(
    entropy: &[u8; 32],
    game_id: GameId,
    now: Timestamp,
    player: &Address,
    sequence: u64,
    is_taken: F,
) -> Result<Board, GameError>
where
    F: Fn(&Board) -> bool,
{
    for attempt in 0..MAX_BOARD_ATTEMPTS {
        let board = Board::from_seed(board_seed(entropy, game_id, now, player, sequence, attempt));
        if !is_taken(&board) {
            return Ok(board);
        }
        tracing::debug!(game_id, %player, attempt, "Board collision, regenerating");
    }

    Err(GameError::BoardSpaceExhausted {
        game_id,
        attempts: MAX_BOARD_ATTEMPTS,
    })
}

use crate::common::traits::EntropySource;
use crate::common::types::{GameId, Timestamp};
use crate::errors::GameError;
use crate::games::board::MAX_NUMBER;
use crate::games::game::Game;
use sha2::{Digest, Sha256};

/// Nonce increments tried before a draw is declared impossible
pub const MAX_DRAW_ATTEMPTS: u32 = 1024;

/// Result of one random step for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    /// New `current_random` for the game
    pub random: u64,
    /// Number to append to the draw history; `None` for a pre-start re-roll
    pub number: Option<u8>,
    /// Nonces consumed, including rejected candidates
    pub attempts: u32,
}

/// Random value generator and number drawer for games
pub struct DrawEngine<E> {
    source: E,
}

impl<E: EntropySource> DrawEngine<E> {
    pub fn new(source: E) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &E {
        &self.source
    }

    pub fn into_source(self) -> E {
        self.source
    }

    /// Rewind to a source captured before a rejected call
    pub fn restore(&mut self, source: E) {
        self.source = source;
    }

    pub fn next_entropy(&mut self) -> [u8; 32] {
        self.source.next_entropy()
    }

    /// Replace the game's random value without drawing a number
    pub fn reroll(&mut self, game: &Game, now: Timestamp, nonce: u64) -> Result<DrawOutcome, GameError> {
        self.step(game, now, nonce, false)
    }

    /// Produce a new random value and a number not yet drawn in the game
    pub fn draw(&mut self, game: &Game, now: Timestamp, nonce: u64) -> Result<DrawOutcome, GameError> {
        self.step(game, now, nonce, true)
    }

    fn step(
        &mut self,
        game: &Game,
        now: Timestamp,
        nonce: u64,
        with_number: bool,
    ) -> Result<DrawOutcome, GameError> {
        let entropy = self.source.next_entropy();

        for attempt in 0..MAX_DRAW_ATTEMPTS {
            let random = derive_random(
                &entropy,
                game.id,
                game.current_random,
                now,
                nonce.wrapping_add(attempt as u64),
            );
            if random == 0 || random == game.current_random {
                continue;
            }

            if !with_number {
                return Ok(DrawOutcome {
                    random,
                    number: None,
                    attempts: attempt + 1,
                });
            }

            let number = number_from_random(random);
            if game.is_drawn(number) {
                let duplicate = GameError::DuplicateDraw {
                    game_id: game.id,
                    number,
                };
                tracing::trace!(attempt, "{}", duplicate);
                continue;
            }

            return Ok(DrawOutcome {
                random,
                number: Some(number),
                attempts: attempt + 1,
            });
        }

        tracing::error!(game_id = game.id, drawn = game.drawn_numbers.len(), "Draw retries exhausted");
        Err(GameError::DrawSpaceExhausted {
            game_id: game.id,
            attempts: MAX_DRAW_ATTEMPTS,
        })
    }
}

/// SHA-256 over the entropy sample, game id, previous value, time and nonce
pub fn derive_random(
    entropy: &[u8; 32],
    game_id: GameId,
    previous: u64,
    now: Timestamp,
    nonce: u64,
) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(entropy);
    hasher.update(game_id.to_be_bytes());
    hasher.update(previous.to_be_bytes());
    hasher.update(now.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();

    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(word)
}

/// Map a random value onto `1..=75`
pub fn number_from_random(random: u64) -> u8 {
    (random % MAX_NUMBER as u64) as u8 + 1
}

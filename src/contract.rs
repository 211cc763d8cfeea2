//! Bingo contract
//!
//! Game registry and lifecycle on top of the admin parameter store, the
//! board manager and the draw engine. Every public mutation takes a
//! [`CallContext`] and is all-or-nothing: validation happens first, the
//! ledger debit is the last fallible step, and nothing is written to the
//! registry or the event log unless the whole call succeeds.

use crate::common::traits::{EntropySource, TokenLedger};
use crate::common::types::{Address, CallContext, GameId, Timestamp, TokenAmount};
use crate::errors::{BingoResult, GameError};
use crate::events::BingoEvent;
use crate::games::board::{self, Board, MAX_NUMBER};
use crate::games::draw_engine::DrawEngine;
use crate::games::game::{Game, GamePhase};
use crate::games::params::{AdminParams, GlobalConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default cap on boards issued per game
pub const DEFAULT_MAX_PLAYERS: usize = 1000;

/// Serializable contract storage: `{globalConfig}` plus `{gameId -> Game}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// Custody account that receives entry fees
    pub address: Address,
    pub admin: AdminParams,
    pub max_players: usize,
    /// Monotonic nonce mixed into every random step
    pub nonce: u64,
    pub games: BTreeMap<GameId, Game>,
}

pub struct Bingo<L, E> {
    state: ContractState,
    ledger: L,
    engine: DrawEngine<E>,
    events: Vec<BingoEvent>,
}

impl<L: TokenLedger, E: EntropySource> Bingo<L, E> {
    /// Deploy a fresh contract owned by `ctx.caller`, holding fees at `address`
    pub fn deploy(
        ctx: CallContext,
        address: Address,
        config: GlobalConfig,
        ledger: L,
        entropy: E,
    ) -> Self {
        let admin = AdminParams::new(ctx.caller, config, ctx.now);
        info!(
            owner = %ctx.caller,
            %address,
            fee = config.fee,
            join_duration = config.join_duration,
            turn_duration = config.turn_duration,
            "Bingo contract deployed"
        );

        Self::from_state(
            ContractState {
                address,
                admin,
                max_players: DEFAULT_MAX_PLAYERS,
                nonce: 0,
                games: BTreeMap::new(),
            },
            ledger,
            entropy,
        )
    }

    /// Rebuild a contract from persisted state
    pub fn from_state(state: ContractState, ledger: L, entropy: E) -> Self {
        Self {
            state,
            ledger,
            engine: DrawEngine::new(entropy),
            events: Vec::new(),
        }
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.state.max_players = max_players;
        self
    }

    pub fn state(&self) -> &ContractState {
        &self.state
    }

    pub fn into_parts(self) -> (ContractState, L, E) {
        (self.state, self.ledger, self.engine.into_source())
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn entropy(&self) -> &E {
        self.engine.source()
    }

    pub fn address(&self) -> Address {
        self.state.address
    }

    pub fn owner(&self) -> Address {
        self.state.admin.owner()
    }

    pub fn events(&self) -> &[BingoEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BingoEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Admin parameter store
    // ------------------------------------------------------------------

    pub fn update_fees(&mut self, ctx: CallContext, fee: TokenAmount) -> BingoResult<()> {
        let previous = self.state.admin.update_fee(&ctx.caller, fee).map_err(log_denied)?;
        info!(previous, current = fee, "Fee updated");
        self.events.push(BingoEvent::FeeUpdated {
            previous,
            current: fee,
        });
        Ok(())
    }

    pub fn update_join_duration_time(&mut self, ctx: CallContext, seconds: u64) -> BingoResult<()> {
        let previous = self
            .state
            .admin
            .update_join_duration(&ctx.caller, seconds)
            .map_err(log_denied)?;
        info!(previous, current = seconds, "Join duration updated");
        self.events.push(BingoEvent::JoinDurationUpdated {
            previous,
            current: seconds,
        });
        Ok(())
    }

    pub fn update_turn_duration_time(&mut self, ctx: CallContext, seconds: u64) -> BingoResult<()> {
        let previous = self
            .state
            .admin
            .update_turn_duration(&ctx.caller, seconds)
            .map_err(log_denied)?;
        info!(previous, current = seconds, "Turn duration updated");
        self.events.push(BingoEvent::TurnDurationUpdated {
            previous,
            current: seconds,
        });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, ctx: CallContext, new_owner: Address) -> BingoResult<()> {
        let previous = self
            .state
            .admin
            .transfer_ownership(&ctx.caller, new_owner)
            .map_err(log_denied)?;
        info!(%previous, current = %new_owner, "Ownership transferred");
        self.events.push(BingoEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Game registry & lifecycle
    // ------------------------------------------------------------------

    /// Explicitly create a game with a fresh join window
    pub fn open_game(&mut self, ctx: CallContext, game_id: GameId) -> BingoResult<()> {
        self.state.admin.ensure_owner(&ctx.caller).map_err(log_denied)?;
        ensure_game_id(game_id)?;
        if self.state.games.contains_key(&game_id) {
            return Err(GameError::GameAlreadyExists(game_id).into());
        }

        let deadline = self.default_join_deadline(ctx.now);
        self.with_game(game_id, ctx.now, deadline, |_, _| Ok(()))
    }

    /// Join `game_id`: pay the fee and receive a board
    pub fn create_board(&mut self, ctx: CallContext, game_id: GameId) -> BingoResult<Board> {
        ensure_game_id(game_id)?;
        let deadline = self.default_join_deadline(ctx.now);

        self.with_game(game_id, ctx.now, deadline, |this, game| {
            let player = ctx.caller;
            if game.started {
                return Err(GameError::AlreadyStarted(game_id).into());
            }
            if game.has_player(&player) {
                return Err(GameError::AlreadyJoined { game_id, player }.into());
            }
            if ctx.now >= game.join_deadline {
                return Err(GameError::JoinWindowClosed {
                    game_id,
                    deadline: game.join_deadline,
                }
                .into());
            }
            if game.player_count() >= this.state.max_players {
                return Err(GameError::GameFull {
                    game_id,
                    max_players: this.state.max_players,
                }
                .into());
            }

            let sequence = game.player_count() as u64;
            let entropy = this.engine.next_entropy();
            let issued = board::generate_unique(
                &entropy,
                game_id,
                ctx.now,
                &player,
                sequence,
                |candidate| game.boards.values().any(|taken| taken == candidate),
            )?;

            let custody = this.state.address;
            this.ledger
                .transfer_from(&custody, &player, &custody, game.fee)
                .map_err(|e| {
                    debug!(game_id, %player, error = %e, "Fee debit rejected");
                    e
                })?;

            game.pot = game.pot.saturating_add(game.fee);
            game.players.push(player);
            game.boards.insert(player, issued.clone());

            info!(game_id, %player, sequence, pot = game.pot, "Player joined");
            this.events.push(BingoEvent::PlayerJoined {
                game_id,
                player,
                sequence,
                fee: game.fee,
            });
            Ok(issued)
        })
    }

    /// Close joining and begin the turn clock
    pub fn start_new_game(&mut self, ctx: CallContext, game_id: GameId) -> BingoResult<()> {
        self.state.admin.ensure_owner(&ctx.caller).map_err(log_denied)?;
        ensure_game_id(game_id)?;
        // A game first seen here gets an already-closed window, unless the
        // deployment's opening window is still running.
        let deadline = self
            .state
            .admin
            .opening_deadline()
            .unwrap_or(ctx.now)
            .max(ctx.now);

        self.with_game(game_id, ctx.now, deadline, |this, game| {
            if game.started {
                return Err(GameError::AlreadyStarted(game_id).into());
            }
            if ctx.now < game.join_deadline {
                return Err(GameError::JoinWindowStillOpen {
                    game_id,
                    deadline: game.join_deadline,
                }
                .into());
            }

            game.started = true;
            game.turn_deadline = ctx.now.saturating_add(game.turn_duration);

            info!(game_id, players = game.player_count(), turn_deadline = game.turn_deadline, "Game started");
            this.events.push(BingoEvent::GameStarted {
                game_id,
                turn_deadline: game.turn_deadline,
                players: game.player_count() as u64,
            });
            Ok(())
        })
    }

    /// Advance the game's random value; once started, also draw a number.
    ///
    /// Returns the new random value.
    pub fn generate_random(&mut self, ctx: CallContext, game_id: GameId) -> BingoResult<u64> {
        self.state.admin.ensure_owner(&ctx.caller).map_err(log_denied)?;
        ensure_game_id(game_id)?;
        let deadline = self.default_join_deadline(ctx.now);

        self.with_game(game_id, ctx.now, deadline, |this, game| {
            if game.finished {
                return Err(GameError::GameFinished(game_id).into());
            }

            let outcome = if game.started {
                this.engine.draw(game, ctx.now, this.state.nonce)?
            } else {
                this.engine.reroll(game, ctx.now, this.state.nonce)?
            };
            this.state.nonce = this.state.nonce.wrapping_add(outcome.attempts as u64);
            game.current_random = outcome.random;

            debug!(game_id, random = outcome.random, attempts = outcome.attempts, "Random generated");
            this.events.push(BingoEvent::RandomGenerated {
                game_id,
                random: outcome.random,
            });

            if let Some(number) = outcome.number {
                game.drawn_numbers.push(number);
                game.turn_deadline = game.turn_deadline.saturating_add(game.turn_duration);

                info!(
                    game_id,
                    number,
                    drawn = game.drawn_numbers.len(),
                    turn_deadline = game.turn_deadline,
                    "Number drawn"
                );
                this.events.push(BingoEvent::NumberDrawn {
                    game_id,
                    number,
                    turn_deadline: game.turn_deadline,
                });

                if game.drawn_numbers.len() >= MAX_NUMBER as usize {
                    game.finished = true;
                    info!(game_id, "All numbers drawn, game finished");
                    this.events.push(BingoEvent::GameFinished { game_id });
                }
            }

            Ok(outcome.random)
        })
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn fees(&self) -> TokenAmount {
        self.state.admin.config().fee
    }

    pub fn join_duration_time(&self) -> u64 {
        self.state.admin.join_duration_time()
    }

    pub fn turn_duration_time(&self) -> u64 {
        self.state.admin.config().turn_duration
    }

    pub fn config(&self) -> GlobalConfig {
        self.state.admin.config()
    }

    pub fn game_start(&self, game_id: GameId) -> bool {
        self.game(game_id).is_some_and(|game| game.started)
    }

    pub fn number_of_player(&self, game_id: GameId) -> u64 {
        self.game(game_id).map_or(0, |game| game.player_count() as u64)
    }

    pub fn random_number(&self, game_id: GameId) -> u64 {
        self.game(game_id).map_or(0, |game| game.current_random)
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.state.games.get(&game_id)
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.state.games.values()
    }

    pub fn game_phase(&self, game_id: GameId, now: Timestamp) -> Option<GamePhase> {
        self.game(game_id).map(|game| game.phase(now))
    }

    pub fn board_of(&self, game_id: GameId, player: &Address) -> Option<&Board> {
        self.game(game_id).and_then(|game| game.board_of(player))
    }

    pub fn drawn_numbers(&self, game_id: GameId) -> &[u8] {
        self.game(game_id)
            .map(|game| game.drawn_numbers.as_slice())
            .unwrap_or_default()
    }

    pub fn pot(&self, game_id: GameId) -> TokenAmount {
        self.game(game_id).map_or(0, |game| game.pot)
    }

    pub fn is_winner(&self, game_id: GameId, player: &Address) -> bool {
        self.game(game_id).is_some_and(|game| {
            game.board_of(player)
                .is_some_and(|board| board.has_bingo(&game.drawn_numbers))
        })
    }

    pub fn winners(&self, game_id: GameId) -> Vec<Address> {
        self.game(game_id).map_or_else(Vec::new, Game::winners)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn default_join_deadline(&self, now: Timestamp) -> Timestamp {
        now.saturating_add(self.state.admin.config().join_duration)
    }

    /// Run `op` against `game_id`, creating the game with `join_deadline` if it
    /// does not exist yet. A newly created game is only kept if `op` succeeds,
    /// and a failed `op` leaves the entropy source and event log as they were.
    fn with_game<T, F>(
        &mut self,
        game_id: GameId,
        now: Timestamp,
        join_deadline: Timestamp,
        op: F,
    ) -> BingoResult<T>
    where
        F: FnOnce(&mut Self, &mut Game) -> BingoResult<T>,
    {
        let (mut game, created) = match self.state.games.remove(&game_id) {
            Some(game) => (game, false),
            None => (
                Game::new(game_id, &self.state.admin.config(), now, join_deadline),
                true,
            ),
        };

        let checkpoint = self.engine.source().clone();
        let mark = self.events.len();
        let result = op(self, &mut game);

        if result.is_err() {
            self.engine.restore(checkpoint);
            self.events.truncate(mark);
        }

        if result.is_ok() && created {
            info!(game_id, join_deadline, fee = game.fee, "Game created");
            self.events.insert(
                mark,
                BingoEvent::GameCreated {
                    game_id,
                    join_deadline,
                    fee: game.fee,
                },
            );
        }
        if result.is_ok() || !created {
            self.state.games.insert(game_id, game);
        }

        result
    }
}

fn ensure_game_id(game_id: GameId) -> Result<(), GameError> {
    if game_id == 0 {
        return Err(GameError::InvalidGameId(game_id));
    }
    Ok(())
}

fn log_denied(err: GameError) -> GameError {
    warn!(error = %err, "Owner-only call rejected");
    err
}
